//! b3scale Operator Library
//!
//! Reconciles `BBBFrontend` custom resources with frontends in a b3scale
//! instance. Tests are included in the module files and under `tests/`.
//!
//! ## Quick Start
//!
//! ```rust
//! use b3scale_operator::prelude::*;
//! ```

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod prelude;
pub mod provider;
pub mod runtime;
pub mod server;
pub mod store;
