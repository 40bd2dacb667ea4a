use crate::error::Result;

use sha2::{Digest, Sha256};

pub trait AttestationStore {
    /// Location the store writes to, e.g. `file:///var/attestations`.
    fn base_uri(&self) -> String;
    /// Stores `document` and returns its id.
    fn store(&self, document: &[u8]) -> Result<String>;
    fn retrieve(&self, id: &str) -> Result<Vec<u8>>;
    /// Ids of every stored document, sorted.
    fn list(&self) -> Result<Vec<String>>;
}

/// The id a document is stored under: the hex SHA-256 of its bytes.
pub fn document_id(document: &[u8]) -> String {
    hex::encode(Sha256::digest(document))
}
