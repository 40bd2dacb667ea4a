use crate::adapters::{Context, MaterialResolver, SubjectExtractor};
use crate::error::{Error, Result};
use crate::in_toto::Statement;
use crate::run_record::RunRecord;
use crate::slsa::{
    self, BuildConfig, ProvenancePredicate, ProvenanceStatement, SchemaVersion, generators, v1,
    v2,
};

use log::{debug, warn};

/// Composes provenance statements from run records.
///
/// The factory holds no state of its own beyond the two adapters, so one
/// instance can serve concurrent callers.
///
/// ```
/// use chains_provenance::adapters::Context;
/// use chains_provenance::error::BoxError;
/// use chains_provenance::in_toto::{Subject, make_minimal_subject};
/// use chains_provenance::run_record::RunRecord;
/// use chains_provenance::slsa::{Material, SchemaVersion, StatementFactory};
///
/// let subjects = |_: &Context, _: &RunRecord| -> Vec<Subject> {
///     vec![make_minimal_subject("registry.local/app", "sha256", "abc")]
/// };
/// let materials = |_: &Context, _: &RunRecord| -> Result<Vec<Material>, BoxError> {
///     Ok(vec![])
/// };
///
/// let factory = StatementFactory::new(&subjects, &materials);
/// let statement = factory
///     .generate_attestation(
///         &Context::background(),
///         "https://tekton.dev/chains/v2",
///         SchemaVersion::V2,
///         &RunRecord::default(),
///     )
///     .unwrap();
///
/// assert_eq!(statement.predicate_type, "https://slsa.dev/provenance/v0.2");
/// assert_eq!(statement.subject.len(), 1);
/// ```
pub struct StatementFactory<'a> {
    subjects: &'a dyn SubjectExtractor,
    materials: &'a dyn MaterialResolver,
}

impl<'a> StatementFactory<'a> {
    pub fn new(subjects: &'a dyn SubjectExtractor, materials: &'a dyn MaterialResolver) -> Self {
        Self {
            subjects,
            materials,
        }
    }

    /// Generates a provenance statement for `run` in the requested format.
    ///
    /// Subjects and materials are taken from the adapters in the order they
    /// return them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MaterialsUnresolved`] if the material resolver
    /// fails. No other step can fail.
    pub fn generate_attestation(
        &self,
        ctx: &Context,
        builder_id: &str,
        version: SchemaVersion,
        run: &RunRecord,
    ) -> Result<ProvenanceStatement> {
        let subjects = self.subjects.extract_subjects(ctx, run);

        let materials = self.materials.resolve_materials(ctx, run).map_err(|e| {
            warn!(
                "Resolving materials for {} '{}' failed: {e}",
                run.kind, run.metadata.name
            );
            Error::MaterialsUnresolved(e)
        })?;

        debug!(
            "Generating {version} provenance for {} '{}' with {} subject(s) and {} material(s)",
            run.kind,
            run.metadata.name,
            subjects.len(),
            materials.len()
        );

        let (build_type, invocation, build_config) = match version {
            SchemaVersion::V1 => (
                run.gvk(),
                v1::invocation(run),
                BuildConfig::V1(v1::build_config(run)),
            ),
            SchemaVersion::V2 => (
                v2::build_type(run),
                v2::invocation(run),
                BuildConfig::V2(v2::build_config(run)),
            ),
        };

        let predicate = ProvenancePredicate {
            builder: generators::make_builder(builder_id),
            build_type,
            invocation,
            build_config,
            metadata: generators::metadata(run),
            materials,
        };

        Ok(Statement::new(
            slsa::PREDICATE_SLSA_PROVENANCE,
            subjects,
            predicate,
        ))
    }
}
