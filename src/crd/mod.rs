//! # Custom Resource Definitions
//!
//! CRD types for the b3scale operator.
//!
//! ## Module Structure
//!
//! - `spec.rs` - `BBBFrontend` specification and credentials
//! - `settings.rs` - Frontend settings and their translation to the b3scale schema
//! - `status.rs` - Status and condition types

mod settings;
mod spec;
mod status;

pub use settings::{DefaultPresentation, FrontendSettings};
pub use spec::{BBBFrontend, BBBFrontendSpec, Credentials, SecretKeyRef};
pub use status::{BBBFrontendStatus, Condition};
