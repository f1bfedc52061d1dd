//! # Prelude
//!
//! Re-exports commonly used types and traits.
//!
//! ```rust
//! use b3scale_operator::prelude::*;
//! ```

// CRD types
pub use crate::crd::*;

// Collaborator seams
pub use crate::provider::{
    ApiError, ApiFrontendSettings, FrontendApi, FrontendKeys, FrontendState, NewFrontend,
};
pub use crate::store::{FrontendStore, SecretStore, StoreError};

// Reconciler types
pub use crate::controller::reconciler::{
    reconcile, reconcile_frontend, BackoffState, Reconciler, ReconcilerError, SecretError,
    ValidationError,
};

// Config types
pub use crate::config::{ControllerConfig, OperatorConfig};
