pub(crate) mod common;
mod provenance_attestation;
