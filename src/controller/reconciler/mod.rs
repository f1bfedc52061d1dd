//! # Reconciler
//!
//! - `reconcile`: the state machine and controller entry point
//! - `validation`, `secrets`: credential checks and secret resolution
//! - `finalizer`, `status`: finalizer and Ready condition bookkeeping
//! - `dependents`: the generated connection secret

pub mod dependents;
pub mod finalizer;
pub mod reconcile;
pub mod secrets;
pub mod status;
pub mod types;
pub mod validation;

pub use reconcile::{reconcile, reconcile_frontend};
pub use types::{
    BackoffState, Reconciler, ReconcilerError, SecretError, ValidationError,
};
