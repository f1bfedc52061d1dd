//! # Controller
//!
//! The reconciliation engine for `BBBFrontend` resources.

pub mod backoff;
pub mod reconciler;
