use crate::error::Result;

use super::commands::TaskRunCommands;
use crate::config::Config;
use crate::slsa::cli::{
    ProvenanceGenerationConfig, generate_taskrun_provenance, verify_provenance_envelope,
};
use crate::storage::AttestationStore;
use crate::storage::filesystem::FilesystemStore;

pub fn handle_taskrun_command(cmd: TaskRunCommands) -> Result<()> {
    match cmd {
        TaskRunCommands::Generate {
            run,
            config,
            builder_id,
            format,
            key,
            hash_alg,
            encoding,
            storage_dir,
            output,
            require_subjects,
        } => {
            let file_config = match config {
                Some(path) => Config::load(&path)?,
                None => Config::default(),
            };

            let storage_path = storage_dir.or(file_config.storage.path);
            let store = storage_path.map(FilesystemStore::new).transpose()?;

            let generation = ProvenanceGenerationConfig {
                run_path: run,
                builder_id: builder_id.unwrap_or(file_config.builder_id),
                format: format
                    .map(|f| f.to_schema_version())
                    .unwrap_or(file_config.format),
                key_path: key.or(file_config.signing.key_path),
                hash_alg: hash_alg
                    .map(|h| h.to_hash_algorithm())
                    .unwrap_or(file_config.signing.hash_alg),
                output_encoding: encoding
                    .map(|e| e.to_output_encoding())
                    .unwrap_or(file_config.output_encoding),
                output,
                storage: store.as_ref().map(|s| s as &dyn AttestationStore),
                require_subjects,
            };

            if let Some(id) = generate_taskrun_provenance(generation)? {
                println!("Provenance stored successfully with ID: {id}");
            }

            Ok(())
        }
        TaskRunCommands::Verify {
            envelope,
            public_key,
            hash_alg,
        } => {
            let statement =
                verify_provenance_envelope(&envelope, &public_key, hash_alg.to_hash_algorithm())?;

            println!("Signature verified");
            println!("Predicate type: {}", statement.predicate_type);
            for subject in &statement.subject {
                let digests: Vec<String> = subject
                    .digest
                    .iter()
                    .map(|(alg, hex)| format!("{alg}:{hex}"))
                    .collect();
                println!("Subject: {} ({})", subject.name, digests.join(", "));
            }

            Ok(())
        }
    }
}
