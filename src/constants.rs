//! # Constants
//!
//! Shared constants used throughout the operator.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Finalizer token that gates deletion of a `BBBFrontend` until its b3scale frontend is released
pub const FINALIZER: &str = "b3scale.infra.run/finalizer";

/// Annotation recording an in-flight frontend creation (value is the idempotency key)
pub const CREATE_ATTEMPT_ANNOTATION: &str = "b3scale.infra.run/create-attempt";

/// Label placed on generated objects naming the owning `BBBFrontend`
pub const FRONTEND_LABEL: &str = "b3scale.infra.run/frontend";

/// Standard managed-by label key and value for generated objects
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub const MANAGED_BY_VALUE: &str = "b3scale-operator";

/// Prefix of generated connection secrets (`b3o-{namespace}-{name}`)
pub const GENERATED_NAME_PREFIX: &str = "b3o";

/// Condition type owned by the operator
pub const READY_CONDITION: &str = "Ready";

/// Reasons written on the Ready condition
pub const REASON_SUCCESS: &str = "SuccessReconcile";
pub const REASON_ERROR: &str = "ErrReconcile";

/// Message written on the Ready condition after a successful run
pub const READY_MESSAGE: &str = "Resource was successfully reconciled";

/// Minimum accepted length (in characters) of a frontend secret
pub const MIN_SECRET_LENGTH: usize = 32;

/// Default config file looked up when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "b3scale-operator-config.yaml";

/// Default HTTP server port for metrics and health checks
pub const DEFAULT_METRICS_PORT: u16 = 5000;

/// Default deadline for a single reconcile run (seconds)
pub const DEFAULT_RECONCILE_TIMEOUT_SECS: u64 = 60;

/// Default per-request timeout for b3scale API calls (seconds)
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 15;

/// Default Fibonacci backoff bounds for retryable errors (seconds)
pub const DEFAULT_BACKOFF_MIN_SECS: u64 = 5;
pub const DEFAULT_BACKOFF_MAX_SECS: u64 = 300;

/// Default requeue for errors that need operator intervention (seconds)
pub const DEFAULT_INVALID_REQUEUE_SECS: u64 = 600;

/// Default interval between successful reconciliations of the same resource (seconds)
pub const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 300;
