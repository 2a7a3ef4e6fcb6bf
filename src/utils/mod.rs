//! Utils Module - Helper Functions & Shared Utilities
//!
//! Constants, JSON persistence and Markdown report rendering.

pub mod constants;
pub mod report;
pub mod store;

pub use report::*;
pub use store::*;
