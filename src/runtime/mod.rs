//! # Runtime
//!
//! - `initialization`: process bootstrap
//! - `watch_loop`: the kube-runtime controller
//! - `error_policy`: requeue decisions for failed runs

pub mod error_policy;
pub mod initialization;
pub mod watch_loop;
