//! Key handling and raw signatures for provenance envelopes.
//!
//! Private keys are PEM files (PKCS#8 or traditional). Their bytes stay in
//! zeroizing buffers for as long as the key is held.

use crate::error::{Error, Result};

use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private, Public};
use openssl::sign::{Signer, Verifier};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use zeroize::{ZeroizeOnDrop, Zeroizing};

pub mod signable;

/// Message digest used when signing an envelope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    fn openssl_digest(self) -> MessageDigest {
        match self {
            HashAlgorithm::Sha256 => MessageDigest::sha256(),
            HashAlgorithm::Sha384 => MessageDigest::sha384(),
            HashAlgorithm::Sha512 => MessageDigest::sha512(),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            other => Err(Error::Validation(format!(
                "Invalid hash algorithm '{other}'. Valid options are: sha256, sha384, sha512"
            ))),
        }
    }
}

/// A private key whose PEM source is wiped when the key is dropped.
#[derive(ZeroizeOnDrop)]
pub struct SecurePrivateKey {
    #[zeroize(skip)]
    key: PKey<Private>,
    _pem: Zeroizing<Vec<u8>>,
}

impl SecurePrivateKey {
    pub fn from_pem(pem: Vec<u8>) -> Result<Self> {
        let pem = Zeroizing::new(pem);
        let key = PKey::private_key_from_pem(&pem)
            .map_err(|e| Error::Signing(format!("Invalid private key: {e}")))?;

        Ok(Self { key, _pem: pem })
    }

    pub fn as_pkey(&self) -> &PKey<Private> {
        &self.key
    }

    /// The public half of the key pair.
    pub fn public_key(&self) -> Result<PKey<Public>> {
        PKey::public_key_from_der(&self.public_key_der()?)
            .map_err(|e| Error::Signing(format!("Invalid public key: {e}")))
    }

    /// Hex SHA-256 of the DER-encoded public key, used as the DSSE `keyid`.
    pub fn key_id(&self) -> Result<String> {
        Ok(hex::encode(Sha256::digest(self.public_key_der()?)))
    }

    /// Signs `data` with this key over the given digest.
    pub fn sign(&self, data: &[u8], hash_alg: HashAlgorithm) -> Result<Vec<u8>> {
        let signing_error = |e: openssl::error::ErrorStack| Error::Signing(e.to_string());

        let mut signer = Signer::new(hash_alg.openssl_digest(), &self.key).map_err(signing_error)?;
        signer.update(data).map_err(signing_error)?;

        let mut buf = Zeroizing::new(vec![0u8; signer.len().map_err(signing_error)?]);
        let written = signer.sign(&mut buf).map_err(signing_error)?;

        Ok(buf[..written].to_vec())
    }

    fn public_key_der(&self) -> Result<Vec<u8>> {
        self.key
            .public_key_to_der()
            .map_err(|e| Error::Signing(format!("Cannot export public key: {e}")))
    }
}

pub fn load_private_key(path: &Path) -> Result<SecurePrivateKey> {
    SecurePrivateKey::from_pem(fs::read(path)?)
}

pub fn load_public_key(path: &Path) -> Result<PKey<Public>> {
    let pem = fs::read(path)?;
    PKey::public_key_from_pem(&pem).map_err(|e| Error::Signing(format!("Invalid public key: {e}")))
}

/// Checks `signature` over `data`. A signature made with another key or
/// digest is reported as `false`, not as an error.
pub fn verify(
    data: &[u8],
    signature: &[u8],
    public_key: &PKey<Public>,
    hash_alg: HashAlgorithm,
) -> Result<bool> {
    let mut verifier = Verifier::new(hash_alg.openssl_digest(), public_key)
        .map_err(|e| Error::Signing(e.to_string()))?;
    verifier
        .update(data)
        .map_err(|e| Error::Signing(e.to_string()))?;

    Ok(verifier.verify(signature).unwrap_or(false))
}
