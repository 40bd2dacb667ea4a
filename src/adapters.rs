//! # Subject and Material Adapters
//!
//! The statement factory does not know how output digests or input
//! materials are found for a particular kind of artifact. It asks two
//! collaborators, once each per generated statement:
//!
//! - a [`SubjectExtractor`], which never fails and may return no subjects
//! - a [`MaterialResolver`], whose failure aborts the whole generation
//!
//! Both must be deterministic for a given run record. Ordering and
//! de-duplication are their responsibility; the factory keeps whatever
//! sequence they return.
//!
//! Closures with the matching signature implement both traits:
//!
//! ```
//! use chains_provenance::adapters::{Context, MaterialResolver};
//! use chains_provenance::error::BoxError;
//! use chains_provenance::run_record::RunRecord;
//! use chains_provenance::slsa::Material;
//!
//! let resolver = |_: &Context, _: &RunRecord| -> Result<Vec<Material>, BoxError> {
//!     Ok(vec![Material::new("git+https://x.git", "sha1", "deadbeef")])
//! };
//!
//! let materials = resolver
//!     .resolve_materials(&Context::background(), &RunRecord::default())
//!     .unwrap();
//! assert_eq!(materials.len(), 1);
//! ```

use crate::error::BoxError;
use crate::in_toto::Subject;
use crate::run_record::RunRecord;
use crate::slsa::Material;

use std::time::{Duration, Instant};

/// Per-call context passed through to the adapters.
///
/// The factory itself never reads it; adapters that do I/O should stop once
/// the deadline has passed.
#[derive(Clone, Debug, Default)]
pub struct Context {
    deadline: Option<Instant>,
}

impl Context {
    /// A context without a deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context expiring after `timeout`. A timeout too large to
    /// represent leaves the context without a deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

pub trait SubjectExtractor: Send + Sync {
    fn extract_subjects(&self, ctx: &Context, run: &RunRecord) -> Vec<Subject>;
}

pub trait MaterialResolver: Send + Sync {
    fn resolve_materials(&self, ctx: &Context, run: &RunRecord)
    -> Result<Vec<Material>, BoxError>;
}

impl<F> SubjectExtractor for F
where
    F: Fn(&Context, &RunRecord) -> Vec<Subject> + Send + Sync,
{
    fn extract_subjects(&self, ctx: &Context, run: &RunRecord) -> Vec<Subject> {
        self(ctx, run)
    }
}

impl<F> MaterialResolver for F
where
    F: Fn(&Context, &RunRecord) -> Result<Vec<Material>, BoxError> + Send + Sync,
{
    fn resolve_materials(
        &self,
        ctx: &Context,
        run: &RunRecord,
    ) -> Result<Vec<Material>, BoxError> {
        self(ctx, run)
    }
}
