//! # Operator Configuration
//!
//! Connection settings of the operator, read from a YAML file:
//!
//! ```yaml
//! kubernetes:
//!   inCluster: {}            # or: outOfCluster: { fileName: /path/to/kubeconfig }
//! b3Scale:
//!   host: b3scale.example.org
//!   accessToken: <admin api token>
//! ```
//!
//! `B3SCALE_HOST`, `B3SCALE_ACCESS_TOKEN` and `KUBECONFIG` override the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to load in-cluster Kubernetes config: {0}")]
    InCluster(#[from] kube::config::InClusterError),
    #[error("failed to load kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorConfig {
    #[serde(default)]
    pub kubernetes: KubernetesConfig,
    #[serde(default)]
    pub b3_scale: B3ScaleConfig,
}

/// How the operator reaches the Kubernetes API. Exactly one mode must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_cluster: Option<InClusterConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_of_cluster: Option<OutOfClusterConfig>,
}

#[allow(
    clippy::empty_structs_with_brackets,
    reason = "Deserializes from an empty YAML mapping (`inCluster: {}`)"
)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InClusterConfig {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutOfClusterConfig {
    pub file_name: PathBuf,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct B3ScaleConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub access_token: String,
}

impl std::fmt::Debug for B3ScaleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("B3ScaleConfig")
            .field("host", &self.host)
            .field("access_token", &"***")
            .finish()
    }
}

impl OperatorConfig {
    /// Load the configuration and apply environment overrides
    ///
    /// An explicitly given `path` must exist. Without one, the default
    /// `b3scale-operator-config.yaml` is read when present and the operator
    /// otherwise runs from environment variables alone, in-cluster.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or the result is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(crate::constants::DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self {
                        kubernetes: KubernetesConfig {
                            in_cluster: Some(InClusterConfig {}),
                            out_of_cluster: None,
                        },
                        b3_scale: B3ScaleConfig::default(),
                    }
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse a YAML document
    ///
    /// # Errors
    /// Returns an error if the document does not match the config layout.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Apply environment overrides from `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = non_empty("B3SCALE_HOST") {
            self.b3_scale.host = host;
        }
        if let Some(token) = non_empty("B3SCALE_ACCESS_TOKEN") {
            self.b3_scale.access_token = token;
        }
        if let Some(kubeconfig) = non_empty("KUBECONFIG") {
            self.kubernetes = KubernetesConfig {
                in_cluster: None,
                out_of_cluster: Some(OutOfClusterConfig {
                    file_name: PathBuf::from(kubeconfig),
                }),
            };
        }
    }

    /// Check that exactly one Kubernetes mode is selected and b3scale access is complete
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.kubernetes.in_cluster, &self.kubernetes.out_of_cluster) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid(
                    "kubernetes: inCluster and outOfCluster are mutually exclusive".into(),
                ))
            }
            (None, None) => {
                return Err(ConfigError::Invalid(
                    "kubernetes: one of inCluster or outOfCluster must be set".into(),
                ))
            }
            (None, Some(out)) if out.file_name.as_os_str().is_empty() => {
                return Err(ConfigError::Invalid(
                    "kubernetes.outOfCluster.fileName must not be empty".into(),
                ))
            }
            _ => {}
        }

        if self.b3_scale.host.trim().is_empty() {
            return Err(ConfigError::Invalid("b3Scale.host must not be empty".into()));
        }
        if self.b3_scale.access_token.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "b3Scale.accessToken must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Base URL of the b3scale API for the given scheme
    #[must_use]
    pub fn b3scale_base_url(&self, scheme: &str) -> String {
        format!("{}://{}", scheme, self.b3_scale.host.trim_end_matches('/'))
    }

    /// Build the Kubernetes client configuration for the selected mode
    ///
    /// # Errors
    /// Returns an error if the in-cluster environment or the kubeconfig cannot be loaded.
    pub async fn kube_config(&self) -> Result<kube::Config, ConfigError> {
        if let Some(out) = &self.kubernetes.out_of_cluster {
            let kubeconfig = kube::config::Kubeconfig::read_from(&out.file_name)?;
            let config = kube::Config::from_custom_kubeconfig(
                kubeconfig,
                &kube::config::KubeConfigOptions::default(),
            )
            .await?;
            return Ok(config);
        }
        Ok(kube::Config::incluster()?)
    }
}
