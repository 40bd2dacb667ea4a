use crate::config::OutputEncoding;
use crate::signing::HashAlgorithm;
use crate::slsa::SchemaVersion;

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum HashAlgorithmChoice {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithmChoice {
    pub fn to_hash_algorithm(self) -> HashAlgorithm {
        match self {
            HashAlgorithmChoice::Sha256 => HashAlgorithm::Sha256,
            HashAlgorithmChoice::Sha384 => HashAlgorithm::Sha384,
            HashAlgorithmChoice::Sha512 => HashAlgorithm::Sha512,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum FormatChoice {
    #[value(name = "slsa/v1", alias = "v1")]
    SlsaV1,
    #[value(name = "slsa/v2alpha1", alias = "v2")]
    SlsaV2Alpha1,
}

impl FormatChoice {
    pub fn to_schema_version(self) -> SchemaVersion {
        match self {
            FormatChoice::SlsaV1 => SchemaVersion::V1,
            FormatChoice::SlsaV2Alpha1 => SchemaVersion::V2,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum EncodingChoice {
    Json,
    Cbor,
}

impl EncodingChoice {
    pub fn to_output_encoding(self) -> OutputEncoding {
        match self {
            EncodingChoice::Json => OutputEncoding::Json,
            EncodingChoice::Cbor => OutputEncoding::Cbor,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum TaskRunCommands {
    /// Generate SLSA provenance for a completed task run
    Generate {
        /// Task run record (.json, .yaml or .yml)
        #[arg(long = "run")]
        run: PathBuf,

        /// Configuration file (YAML)
        #[arg(long = "config")]
        config: Option<PathBuf>,

        /// Builder identity recorded in the predicate
        #[arg(long = "builder-id")]
        builder_id: Option<String>,

        /// Provenance format
        #[arg(long = "format", value_enum)]
        format: Option<FormatChoice>,

        /// Path to private key file for signing (PEM format)
        #[arg(long = "key")]
        key: Option<PathBuf>,

        /// Hash algorithm to use for signing (default: sha256)
        #[arg(long = "hash-alg", value_enum)]
        hash_alg: Option<HashAlgorithmChoice>,

        /// Output encoding (default: json)
        #[arg(long = "encoding", value_enum)]
        encoding: Option<EncodingChoice>,

        /// Directory to store the generated document in
        #[arg(long = "storage-dir")]
        storage_dir: Option<PathBuf>,

        /// Write the document to this file instead of stdout
        #[arg(long = "output", short = 'o')]
        output: Option<PathBuf>,

        /// Fail when no subjects can be extracted
        #[arg(long = "require-subjects")]
        require_subjects: bool,
    },

    /// Verify a signed provenance envelope
    Verify {
        /// DSSE envelope (JSON)
        #[arg(long = "envelope")]
        envelope: PathBuf,

        /// Public key file (PEM format)
        #[arg(long = "public-key")]
        public_key: PathBuf,

        /// Hash algorithm the envelope was signed with
        #[arg(long = "hash-alg", value_enum, default_value = "sha256")]
        hash_alg: HashAlgorithmChoice,
    },
}
