use crate::run_record::{ConfigSource, ObjectMeta, Param, ParamSpec, RunRecord};
use crate::slsa::{self, Builder, Invocation, Metadata};

use std::collections::BTreeMap;

/// Annotation written by `kubectl apply`; never part of provenance.
pub const LAST_APPLIED_CONFIG_ANNOTATION: &str = "kubectl.kubernetes.io/last-applied-configuration";

/// Annotations under this prefix are bookkeeping of the attestation
/// pipeline itself.
pub const CHAINS_ANNOTATION_PREFIX: &str = "chains.tekton.dev/";

pub fn make_builder(id: &str) -> Builder {
    Builder { id: id.to_string() }
}

/// Start time, completion time and reproducibility of a run.
///
/// Timestamps are normalized to UTC; a missing timestamp stays unset.
///
/// ```
/// use chains_provenance::run_record::RunRecord;
/// use chains_provenance::slsa::generators::metadata;
///
/// let run = RunRecord::from_json(r#"{
///     "metadata": {"labels": {"chains.tekton.dev/reproducible": "true"}},
///     "status": {"startTime": "2023-05-01T12:00:00+02:00"}
/// }"#).unwrap();
///
/// let m = metadata(&run);
/// assert!(m.reproducible);
/// assert_eq!(m.build_started_on.unwrap().to_rfc3339(), "2023-05-01T10:00:00+00:00");
/// assert!(m.build_finished_on.is_none());
/// ```
pub fn metadata(run: &RunRecord) -> Metadata {
    let reproducible = run
        .labels()
        .get(slsa::CHAINS_REPRODUCIBLE_ANNOTATION)
        .is_some_and(|value| value == "true");

    Metadata {
        build_started_on: run.status.start_time.map(|t| t.to_utc()),
        build_finished_on: run.status.completion_time.map(|t| t.to_utc()),
        reproducible,
        ..Default::default()
    }
}

/// Builds an invocation from declared parameters, their declarations and
/// the object metadata.
///
/// Parameters start from every declared default and are overridden by the
/// explicitly supplied values. The environment carries the object's labels
/// and its annotations minus pipeline bookkeeping; empty maps are left out.
pub fn invocation(
    source: Option<&ConfigSource>,
    params: &[Param],
    param_specs: &[ParamSpec],
    meta: &ObjectMeta,
) -> Invocation {
    let mut parameters = BTreeMap::new();
    for spec in param_specs {
        if let Some(default) = &spec.default {
            parameters.insert(spec.name.clone(), default.to_json());
        }
    }
    for param in params {
        parameters.insert(param.name.clone(), param.value.to_json());
    }

    let annotations: BTreeMap<String, String> = meta
        .annotations
        .iter()
        .filter(|(name, _)| {
            name.as_str() != LAST_APPLIED_CONFIG_ANNOTATION
                && !name.starts_with(CHAINS_ANNOTATION_PREFIX)
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let mut environment = BTreeMap::new();
    if !annotations.is_empty() {
        environment.insert("annotations".to_string(), annotations);
    }
    if !meta.labels.is_empty() {
        environment.insert("labels".to_string(), meta.labels.clone());
    }

    Invocation {
        config_source: source.map(slsa::ConfigSource::from),
        parameters,
        environment: (!environment.is_empty()).then_some(environment),
    }
}
