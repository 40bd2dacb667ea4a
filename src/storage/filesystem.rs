use crate::error::{Error, Result};
use crate::storage::traits::{AttestationStore, document_id};

use log::debug;
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FilesystemStore {
    base_path: PathBuf,
}

impl FilesystemStore {
    /// Opens a store rooted at `url`, a directory path or `file://` URL.
    /// The directory is created if it does not exist.
    pub fn new<P: AsRef<Path>>(url: P) -> Result<Self> {
        let path_str = url.as_ref().to_string_lossy();
        let path = match path_str.strip_prefix("file://") {
            Some(stripped) => PathBuf::from(stripped),
            None => PathBuf::from(path_str.to_string()),
        };

        if !path.exists() {
            create_dir_all(&path)?;
        }

        Ok(Self { base_path: path })
    }

    fn document_path(&self, id: &str) -> Result<PathBuf> {
        if id.len() != 64 || !id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::Validation(format!("Invalid attestation id: {id}")));
        }
        Ok(self.base_path.join(format!("{id}.json")))
    }
}

impl AttestationStore for FilesystemStore {
    fn base_uri(&self) -> String {
        format!("file://{}", self.base_path.display())
    }

    fn store(&self, document: &[u8]) -> Result<String> {
        let id = document_id(document);
        let path = self.document_path(&id)?;

        fs::write(&path, document)?;
        debug!("Stored attestation {id} at {}", path.display());

        Ok(id)
    }

    fn retrieve(&self, id: &str) -> Result<Vec<u8>> {
        let path = self.document_path(id)?;

        if !path.exists() {
            return Err(Error::Storage(format!("Attestation not found: {id}")));
        }

        Ok(fs::read(path)?)
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = fs::read_dir(&self.base_path)?
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if !path.is_file() || path.extension().is_none_or(|ext| ext != "json") {
                    return None;
                }
                let stem = path.file_stem()?.to_str()?.to_string();
                self.document_path(&stem).ok().map(|_| stem)
            })
            .collect();

        ids.sort();
        Ok(ids)
    }
}
