//! Core Module - Detection & Tracking Logic
//!
//! Rules, candidate discovery, fingerprint verification and the run itself.

pub mod discovery;
pub mod rules;
pub mod tracker;
pub mod verifier;

pub use discovery::*;
pub use rules::*;
pub use tracker::*;
pub use verifier::*;
