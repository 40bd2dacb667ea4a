//! Invocation and build configuration for the `slsa/v2alpha1` format.

use crate::run_record::{RunRecord, TaskRunResult, TaskSpec};
use crate::slsa::{self, Invocation, SchemaVersion};

use serde::{Deserialize, Serialize};

/// The `buildConfig` section: the resolved task spec and the results the
/// run declared, in order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    pub task_spec: Option<TaskSpec>,
    pub task_run_results: Vec<TaskRunResult>,
}

/// `https://chains.tekton.dev/format/slsa/v2alpha1/type/<object kind>`
pub fn build_type(run: &RunRecord) -> String {
    format!(
        "{}/{}/type/{}",
        slsa::BUILD_TYPE_FORMAT_PREFIX,
        SchemaVersion::V2.format_name(),
        run.gvk()
    )
}

/// The config source comes verbatim from the run's provenance hint. The
/// parameters are every field of the declared spec except the task
/// reference and inline task spec, which the config source and build
/// config already cover.
pub fn invocation(run: &RunRecord) -> Invocation {
    Invocation {
        config_source: run.config_source().map(slsa::ConfigSource::from),
        parameters: run.spec.invocation_parameters(),
        environment: None,
    }
}

pub fn build_config(run: &RunRecord) -> BuildConfig {
    BuildConfig {
        task_spec: run.status.task_spec.clone(),
        task_run_results: run.status.task_results.clone(),
    }
}
