//! Invocation and build configuration for the `slsa/v1` format.

use crate::run_record::{RunRecord, TaskSpec};
use crate::slsa::Invocation;
use crate::slsa::generators;

/// Describes the event that started the run.
///
/// The config source is never set: at this format version the material the
/// task definition came from is unknown, even when the run carries a
/// provenance hint. `slsa/v2alpha1` records it.
pub fn invocation(run: &RunRecord) -> Invocation {
    let param_specs = run
        .status
        .task_spec
        .as_ref()
        .map(|spec| spec.params.as_slice())
        .unwrap_or_default();

    generators::invocation(None, &run.spec.params, param_specs, &run.metadata)
}

/// The resolved task spec, as produced by the orchestrator.
pub fn build_config(run: &RunRecord) -> Option<TaskSpec> {
    run.status.task_spec.clone()
}
