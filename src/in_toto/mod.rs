//! # in-toto Statements
//!
//! This module defines the in-toto v0.1 statement envelope used for
//! provenance, the subject descriptor, and helpers for wrapping a statement
//! in a signed Dead Simple Signing Envelope (DSSE).
//!
//! ## Examples
//!
//! ```
//! use chains_provenance::in_toto::{Subject, make_minimal_subject};
//!
//! let subject = make_minimal_subject("registry.local/app", "sha256", "abc123");
//! assert_eq!(subject.name, "registry.local/app");
//! assert_eq!(subject.digest.get("sha256").map(String::as_str), Some("abc123"));
//! ```

use crate::error::{Error, Result};
use crate::signing::HashAlgorithm;
use crate::signing::signable::Signable;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub mod dsse;

use dsse::Envelope;

/// The `_type` of every statement produced by this crate.
pub const STATEMENT_IN_TOTO_V01: &str = "https://in-toto.io/Statement/v0.1";

pub const DSSE_PAYLOAD_TYPE: &str = "application/vnd.in-toto+json";

/// Maps a digest algorithm name (`sha256`, `sha1`, ...) to a hex digest.
pub type DigestSet = BTreeMap<String, String>;

/// An artifact the statement is about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub digest: DigestSet,
}

/// The outer statement envelope, generic over the predicate it carries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement<P> {
    #[serde(rename = "_type")]
    pub statement_type: String,
    pub predicate_type: String,
    pub subject: Vec<Subject>,
    pub predicate: P,
}

impl<P> Statement<P> {
    pub fn new(predicate_type: &str, subject: Vec<Subject>, predicate: P) -> Self {
        Self {
            statement_type: STATEMENT_IN_TOTO_V01.to_string(),
            predicate_type: predicate_type.to_string(),
            subject,
            predicate,
        }
    }
}

pub fn make_minimal_subject(name: &str, alg: &str, digest: &str) -> Subject {
    Subject {
        name: name.to_string(),
        digest: BTreeMap::from([(alg.to_string(), digest.to_string())]),
    }
}

/// Splits an `alg:hex` digest into its parts.
///
/// Returns `None` when either side is empty or the separator is missing.
pub fn parse_digest(value: &str) -> Option<(&str, &str)> {
    let (alg, hex) = value.trim().split_once(':')?;
    if alg.is_empty() || hex.is_empty() {
        return None;
    }
    Some((alg, hex))
}

/// Serializes a statement to JSON and wraps it in a signed DSSE envelope.
pub fn generate_signed_statement<P: Serialize>(
    statement: &Statement<P>,
    key_path: PathBuf,
    hash_alg: HashAlgorithm,
) -> Result<Envelope> {
    let serialized_statement = serde_json::to_vec(statement).map_err(|e| {
        Error::Serialization(format!("Failed to serialize in-toto statement: {e}"))
    })?;

    let mut envelope = Envelope::new(&serialized_statement, DSSE_PAYLOAD_TYPE.to_string());
    envelope.sign(key_path, hash_alg)?;

    Ok(envelope)
}
