//! # Attestation Storage
//!
//! Generated documents (signed envelopes or bare statements) are kept in a
//! content-addressed store: the id of a document is the hex SHA-256 of its
//! bytes, so storing the same document twice yields the same id.
//!
//! ```
//! use chains_provenance::storage::AttestationStore;
//! use chains_provenance::storage::filesystem::FilesystemStore;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = FilesystemStore::new(dir.path()).unwrap();
//!
//! let id = store.store(br#"{"payloadType":"application/vnd.in-toto+json"}"#).unwrap();
//! assert_eq!(id.len(), 64);
//! assert_eq!(store.list().unwrap(), vec![id.clone()]);
//! ```

pub mod filesystem;
pub mod traits;

pub use traits::AttestationStore;
