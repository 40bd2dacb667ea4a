//! # Chains Provenance
//!
//! Generates SLSA provenance for completed task runs.
//!
//! Given a run record (what ran, with which parameters, when, and what it
//! produced), the crate builds an in-toto statement with a SLSA v0.2
//! provenance predicate in either the `slsa/v1` or the `slsa/v2alpha1`
//! layout, ready to be signed.
//!
//! ## Quick Start
//!
//! ```bash
//! chains-provenance taskrun generate \
//!     --run taskrun.json \
//!     --format slsa/v2alpha1 \
//!     --key signing_key.pem
//! ```
//!
//! ## Library Use
//!
//! ```
//! use chains_provenance::adapters::Context;
//! use chains_provenance::resolvers::{ResultSubjectExtractor, RunMaterialResolver};
//! use chains_provenance::run_record::RunRecord;
//! use chains_provenance::slsa::{SchemaVersion, StatementFactory};
//!
//! let run = RunRecord::from_json(r#"{
//!     "apiVersion": "tekton.dev/v1beta1",
//!     "kind": "TaskRun",
//!     "status": {"taskResults": [
//!         {"name": "IMAGE_URL", "value": "registry.local/app"},
//!         {"name": "IMAGE_DIGEST", "value": "sha256:abc"}
//!     ]}
//! }"#).unwrap();
//!
//! let factory = StatementFactory::new(&ResultSubjectExtractor, &RunMaterialResolver);
//! let statement = factory
//!     .generate_attestation(&Context::background(), "https://tekton.dev/chains/v2", SchemaVersion::V1, &run)
//!     .unwrap();
//!
//! assert_eq!(statement.predicate.build_type, "tekton.dev/v1beta1/TaskRun");
//! assert_eq!(statement.subject[0].name, "registry.local/app");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod error;
pub mod in_toto;
pub mod resolvers;
pub mod run_record;
pub mod signing;
pub mod slsa;
pub mod storage;
#[cfg(test)]
mod tests;

pub use error::{Error, Result};

/// Initialize logging for the CLI
///
/// The filter is read from `RUST_LOG`.
///
/// ```
/// use chains_provenance::init_logging;
///
/// // Fails if a logger is already installed
/// let result = init_logging();
/// assert!(result.is_ok() || result.is_err());
/// ```
pub fn init_logging() -> Result<()> {
    env_logger::try_init().map_err(|e| Error::InitializationError(e.to_string()))
}
