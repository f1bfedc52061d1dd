//! # CRD Generator
//!
//! Prints the `BBBFrontend` CustomResourceDefinition as YAML.
//!
//! ```bash
//! cargo run --bin crdgen > config/crd/bbbfrontend.yaml
//! cargo run --bin crdgen | kubectl apply -f -
//! ```

use b3scale_operator::crd::BBBFrontend;
use kube::core::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    print!("{}", serde_yaml::to_string(&BBBFrontend::crd())?);
    Ok(())
}
