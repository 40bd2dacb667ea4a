//! # Signable Trait
//!
//! Common interface for attaching a signature to a document using a private
//! key on disk.
//!
//! ```no_run
//! use chains_provenance::in_toto::dsse::Envelope;
//! use chains_provenance::signing::HashAlgorithm;
//! use chains_provenance::signing::signable::Signable;
//! use std::path::PathBuf;
//!
//! let mut envelope = Envelope::new(b"{}", "application/vnd.in-toto+json".to_string());
//! envelope
//!     .sign(PathBuf::from("signing_key.pem"), HashAlgorithm::Sha256)
//!     .unwrap();
//! assert!(envelope.validate());
//! ```

use crate::error::Result;
use crate::signing::HashAlgorithm;

use std::path::PathBuf;

pub trait Signable {
    /// Signs the value with the PEM private key at `key_path`.
    ///
    /// ## Errors
    ///
    /// - the key file cannot be read or is not a PEM private key
    /// - the key type does not support `hash_alg`
    /// - the signature is empty
    fn sign(&mut self, key_path: PathBuf, hash_alg: HashAlgorithm) -> Result<()>;
}
