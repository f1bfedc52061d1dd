//! # Configuration
//!
//! - `operator`: connection settings (Kubernetes access mode, b3scale host and token)
//!   loaded from a YAML file with environment overrides
//! - `controller`: runtime tunables read from environment variables

pub mod controller;
pub mod operator;

pub use controller::ControllerConfig;
pub use operator::{
    B3ScaleConfig, ConfigError, InClusterConfig, KubernetesConfig, OperatorConfig,
    OutOfClusterConfig,
};
