use crate::adapters::Context;
use crate::config::OutputEncoding;
use crate::error::{Error, Result};
use crate::in_toto::{self, DSSE_PAYLOAD_TYPE, Statement, dsse::Envelope};
use crate::resolvers::{ResultSubjectExtractor, RunMaterialResolver};
use crate::run_record::load_run_record;
use crate::signing::{self, HashAlgorithm};
use crate::slsa::{ProvenanceStatement, SchemaVersion, StatementFactory};
use crate::storage::AttestationStore;

use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub struct ProvenanceGenerationConfig<'a> {
    pub run_path: PathBuf,
    pub builder_id: String,
    pub format: SchemaVersion,
    pub key_path: Option<PathBuf>,
    pub hash_alg: HashAlgorithm,
    pub output_encoding: OutputEncoding,
    /// Written to stdout when unset.
    pub output: Option<PathBuf>,
    pub storage: Option<&'a dyn AttestationStore>,
    pub require_subjects: bool,
}

/// What the generate flow emits: a signed envelope when a key is
/// configured, the bare statement otherwise.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ProvenanceDocument {
    Signed(Envelope),
    Unsigned(ProvenanceStatement),
}

/// Generates provenance for the run record at `config.run_path` using the
/// result-based adapters, then signs, encodes, writes and stores it.
///
/// Returns the storage id when a store is configured.
pub fn generate_taskrun_provenance(config: ProvenanceGenerationConfig<'_>) -> Result<Option<String>> {
    let run = load_run_record(&config.run_path)?;

    let subjects = ResultSubjectExtractor;
    let materials = RunMaterialResolver;
    let factory = StatementFactory::new(&subjects, &materials);
    let statement = factory.generate_attestation(
        &Context::background(),
        &config.builder_id,
        config.format,
        &run,
    )?;

    if statement.subject.is_empty() {
        if config.require_subjects {
            return Err(Error::Validation(format!(
                "No subjects found for {} '{}'",
                run.kind, run.metadata.name
            )));
        }
        warn!(
            "Provenance for {} '{}' has no subjects",
            run.kind, run.metadata.name
        );
    }

    let document = match config.key_path {
        Some(key_path) => ProvenanceDocument::Signed(in_toto::generate_signed_statement(
            &statement,
            key_path,
            config.hash_alg,
        )?),
        None => ProvenanceDocument::Unsigned(statement),
    };

    let stored_id = match config.storage {
        Some(storage) => {
            let json = serde_json::to_vec(&document)
                .map_err(|e| Error::Serialization(e.to_string()))?;
            let id = storage.store(&json)?;
            info!("Stored provenance at {} with ID: {id}", storage.base_uri());
            Some(id)
        }
        None => None,
    };

    let rendered = encode_document(&document, config.output_encoding)?;
    match &config.output {
        Some(path) => {
            fs::write(path, rendered.as_bytes())?;
            info!("Wrote provenance to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(stored_id)
}

/// Pretty JSON, or hex-encoded CBOR.
pub fn encode_document<T: Serialize>(document: &T, encoding: OutputEncoding) -> Result<String> {
    match encoding {
        OutputEncoding::Json => serde_json::to_string_pretty(document)
            .map_err(|e| Error::Serialization(e.to_string())),
        OutputEncoding::Cbor => {
            let cbor =
                serde_cbor::to_vec(document).map_err(|e| Error::Serialization(e.to_string()))?;
            Ok(hex::encode(cbor))
        }
    }
}

/// Checks the signature of a DSSE envelope holding an in-toto statement and
/// returns the statement.
pub fn verify_provenance_envelope(
    envelope_path: &Path,
    public_key_path: &Path,
    hash_alg: HashAlgorithm,
) -> Result<Statement<Value>> {
    let envelope: Envelope = serde_json::from_slice(&fs::read(envelope_path)?)?;

    if envelope.payload_type() != DSSE_PAYLOAD_TYPE {
        return Err(Error::Validation(format!(
            "Unexpected payload type '{}', expected '{DSSE_PAYLOAD_TYPE}'",
            envelope.payload_type()
        )));
    }

    let public_key = signing::load_public_key(public_key_path)?;
    if !envelope.verify(&public_key, hash_alg)? {
        return Err(Error::Signing(
            "DSSE signature verification failed".to_string(),
        ));
    }

    Ok(serde_json::from_slice(envelope.payload())?)
}
