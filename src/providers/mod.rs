//! Providers Module - External Data Sources
//!
//! The block explorer API and the trait the rest of the crate talks to.

pub mod explorer;

pub use explorer::*;
