use crate::error::{Error, Result};
use crate::signing;
use crate::signing::HashAlgorithm;
use crate::signing::signable::Signable;

use openssl::pkey::{PKey, Public};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::path::PathBuf;

#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Signature {
    #[serde_as(as = "serde_with::base64::Base64")]
    sig: Vec<u8>,
    #[serde(default)]
    keyid: String,
}

impl Signature {
    fn new(sig: Vec<u8>, keyid: String) -> Self {
        Self { sig, keyid }
    }

    pub fn keyid(&self) -> &str {
        &self.keyid
    }
}

#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde_as(as = "serde_with::base64::Base64")]
    payload: Vec<u8>,
    payload_type: String,
    signatures: Vec<Signature>,
}

/// DSSE v1 pre-authentication encoding of a payload and its type.
pub fn pae(payload_type: &str, payload: &[u8]) -> Vec<u8> {
    let mut encoded = format!(
        "DSSEv1 {} {} {} ",
        payload_type.len(),
        payload_type,
        payload.len()
    )
    .into_bytes();
    encoded.extend_from_slice(payload);
    encoded
}

impl Envelope {
    pub fn new(payload: &[u8], payload_type: String) -> Self {
        Self {
            payload: payload.to_vec(),
            payload_type,
            signatures: vec![],
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn payload_type(&self) -> &str {
        &self.payload_type
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn add_signature(&mut self, sig: Vec<u8>, keyid: String) -> Result<()> {
        if sig.is_empty() {
            return Err(Error::Signing("DSSE signature cannot be empty".to_string()));
        }

        self.signatures.push(Signature::new(sig, keyid));

        Ok(())
    }

    pub fn validate(&self) -> bool {
        if self.payload.is_empty() || self.payload_type.is_empty() || self.signatures.is_empty() {
            return false;
        }

        self.signatures.iter().all(|s| !s.sig.is_empty())
    }

    /// Returns true if any signature verifies against `public_key`.
    pub fn verify(&self, public_key: &PKey<Public>, hash_alg: HashAlgorithm) -> Result<bool> {
        if !self.validate() {
            return Ok(false);
        }

        let message = pae(&self.payload_type, &self.payload);
        for signature in &self.signatures {
            if signing::verify(&message, &signature.sig, public_key, hash_alg)? {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

impl Signable for Envelope {
    fn sign(&mut self, key_path: PathBuf, hash_alg: HashAlgorithm) -> Result<()> {
        let private_key = signing::load_private_key(&key_path)?;

        let message = pae(&self.payload_type, &self.payload);
        let signature = private_key.sign(&message, hash_alg)?;

        self.add_signature(signature, private_key.key_id()?)
    }
}
