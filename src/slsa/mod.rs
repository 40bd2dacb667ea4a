//! # SLSA Provenance
//!
//! This module turns a completed [`RunRecord`](crate::run_record::RunRecord)
//! into an in-toto statement carrying a SLSA v0.2 provenance predicate.
//!
//! SLSA provenance records:
//! - What was built (the statement subjects)
//! - How it was built (invocation parameters and build configuration)
//! - Who built it (builder identity)
//! - When it was built (start and finish timestamps)
//! - From what (the materials)
//!
//! ## Schema Versions
//!
//! Two predicate layouts are produced side by side, selected with
//! [`SchemaVersion`]:
//!
//! | Version | `buildType` | `buildConfig` | `invocation.configSource` |
//! |---|---|---|---|
//! | `slsa/v1` | object kind, e.g. `tekton.dev/v1beta1/TaskRun` | resolved task spec | never set |
//! | `slsa/v2alpha1` | `https://chains.tekton.dev/format/slsa/v2alpha1/type/<kind>` | task spec and results | copied from the run's provenance |
//!
//! Both use the same `predicateType`, [`PREDICATE_SLSA_PROVENANCE`].
//!
//! ## Key Components
//!
//! - [`StatementFactory`] - composes a full statement from a run record
//! - [`generators`] - builders shared by every schema version
//! - [`v1`], [`v2`] - version-specific invocation and build-config builders
//! - [`cli`] - the generate/sign/encode flow behind the command line
pub mod cli;
pub mod generators;
pub mod statement;
pub mod v1;
pub mod v2;

pub use statement::StatementFactory;

use crate::error::{Error, Result};
use crate::in_toto::{DigestSet, Statement};
use crate::run_record::{self, TaskSpec};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The in-toto predicate type of SLSA v0.2 provenance.
///
/// ```
/// use chains_provenance::slsa::PREDICATE_SLSA_PROVENANCE;
///
/// assert_eq!(PREDICATE_SLSA_PROVENANCE, "https://slsa.dev/provenance/v0.2");
/// ```
pub const PREDICATE_SLSA_PROVENANCE: &str = "https://slsa.dev/provenance/v0.2";

/// Label that marks a run as reproducible when set to exactly `"true"`.
pub const CHAINS_REPRODUCIBLE_ANNOTATION: &str = "chains.tekton.dev/reproducible";

/// Prefix of the composed build type used by `slsa/v2alpha1`.
pub const BUILD_TYPE_FORMAT_PREFIX: &str = "https://chains.tekton.dev/format";

pub type ProvenanceStatement = Statement<ProvenancePredicate>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaVersion {
    #[serde(rename = "slsa/v1", alias = "v1")]
    V1,
    #[default]
    #[serde(rename = "slsa/v2alpha1", alias = "v2")]
    V2,
}

impl SchemaVersion {
    /// Name of the payload format this version produces.
    pub fn format_name(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => "slsa/v1",
            SchemaVersion::V2 => "slsa/v2alpha1",
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.format_name())
    }
}

impl FromStr for SchemaVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "slsa/v1" | "v1" => Ok(SchemaVersion::V1),
            "slsa/v2alpha1" | "v2" => Ok(SchemaVersion::V2),
            other => Err(Error::Validation(format!(
                "Invalid provenance format '{other}'. Valid options are: slsa/v1, slsa/v2alpha1"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Builder {
    pub id: String,
}

/// Where the build definition came from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigSource {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uri: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub digest: DigestSet,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub entry_point: String,
}

impl From<&run_record::ConfigSource> for ConfigSource {
    fn from(source: &run_record::ConfigSource) -> Self {
        Self {
            uri: source.uri.clone(),
            digest: source.digest.clone(),
            entry_point: source.entry_point.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_source: Option<ConfigSource>,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<BTreeMap<String, BTreeMap<String, String>>>,
}

/// Which parts of the predicate are claimed to be complete. This generator
/// makes no such claims.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Completeness {
    pub parameters: bool,
    pub environment: bool,
    pub materials: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_started_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_finished_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completeness: Completeness,
    #[serde(default)]
    pub reproducible: bool,
}

/// An input artifact the run consumed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub uri: String,
    #[serde(default)]
    pub digest: DigestSet,
}

impl Material {
    pub fn new(uri: &str, alg: &str, digest: &str) -> Self {
        Self {
            uri: uri.to_string(),
            digest: BTreeMap::from([(alg.to_string(), digest.to_string())]),
        }
    }
}

/// The version-specific `buildConfig` section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BuildConfig {
    V2(v2::BuildConfig),
    V1(Option<TaskSpec>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenancePredicate {
    pub builder: Builder,
    pub build_type: String,
    pub invocation: Invocation,
    pub build_config: BuildConfig,
    pub metadata: Metadata,
    pub materials: Vec<Material>,
}

impl ProvenancePredicate {
    /// The schema version whose build-config shape this predicate carries.
    pub fn schema_version(&self) -> SchemaVersion {
        match self.build_config {
            BuildConfig::V1(_) => SchemaVersion::V1,
            BuildConfig::V2(_) => SchemaVersion::V2,
        }
    }
}
