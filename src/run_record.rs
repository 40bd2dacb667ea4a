//! # Run Records
//!
//! A run record is the immutable description of one completed task run as it
//! is stored by the orchestration system: object identity, the declared spec,
//! and the status written back once the run finished (timing, resolved spec,
//! results and provenance hints).
//!
//! The types mirror the JSON/YAML shape of a Tekton `TaskRun` (camelCase
//! keys). Sub-objects this crate never interprets are kept as
//! [`serde_json::Value`] so they can be forwarded into a statement verbatim.
//!
//! ## Examples
//!
//! ```
//! use chains_provenance::run_record::RunRecord;
//!
//! let run = RunRecord::from_json(r#"{
//!     "apiVersion": "tekton.dev/v1beta1",
//!     "kind": "TaskRun",
//!     "metadata": {"name": "build-1"},
//!     "spec": {"params": [{"name": "IMAGE", "value": "x"}]},
//!     "status": {"startTime": "2023-05-01T10:00:00+02:00"}
//! }"#).unwrap();
//!
//! assert_eq!(run.gvk(), "tekton.dev/v1beta1/TaskRun");
//! assert_eq!(run.spec.params[0].name, "IMAGE");
//! ```

use crate::error::{Error, Result};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A parameter or result value: a string, an array of strings or an object
/// of strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Array(Vec<String>),
    Object(BTreeMap<String, String>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ParamValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Converts the value into its structured JSON shape.
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::String(s) => Value::String(s.clone()),
            ParamValue::Array(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            ParamValue::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub value: ParamValue,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The resolved task specification. Only the parameter declarations are
/// modelled; every other field is carried through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamSpec>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// The declared execution parameters of a run.
///
/// Adding a field here requires a decision in
/// [`TaskRunSpec::invocation_parameters`], which destructures the struct
/// exhaustively.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskRunSpec {
    pub debug: Option<Value>,
    pub params: Vec<Param>,
    /// Declared input and output resources (`v1beta1` only).
    pub resources: Option<Value>,
    pub service_account_name: String,
    pub task_ref: Option<TaskRef>,
    pub task_spec: Option<TaskSpec>,
    pub status: String,
    pub status_message: String,
    pub retries: u32,
    pub timeout: Option<String>,
    pub pod_template: Option<Value>,
    pub workspaces: Vec<Value>,
    pub step_overrides: Vec<Value>,
    pub sidecar_overrides: Vec<Value>,
    pub compute_resources: Option<Value>,
}

impl TaskRunSpec {
    /// Every spec field except the task reference and the inline task spec,
    /// keyed by field name. Those two are already described by the config
    /// source and the build config of a statement.
    pub fn invocation_parameters(&self) -> BTreeMap<String, Value> {
        let TaskRunSpec {
            debug,
            params,
            resources,
            service_account_name,
            task_ref: _,
            task_spec: _,
            status,
            status_message,
            retries,
            timeout,
            pod_template,
            workspaces,
            step_overrides,
            sidecar_overrides,
            compute_resources,
        } = self;

        BTreeMap::from([
            ("Debug".to_string(), to_json(debug)),
            ("Params".to_string(), to_json(params)),
            ("Resources".to_string(), to_json(resources)),
            (
                "ServiceAccountName".to_string(),
                Value::String(service_account_name.clone()),
            ),
            ("Status".to_string(), Value::String(status.clone())),
            (
                "StatusMessage".to_string(),
                Value::String(status_message.clone()),
            ),
            ("Retries".to_string(), Value::from(*retries)),
            ("Timeout".to_string(), to_json(timeout)),
            ("PodTemplate".to_string(), to_json(pod_template)),
            ("Workspaces".to_string(), to_json(workspaces)),
            ("StepOverrides".to_string(), to_json(step_overrides)),
            ("SidecarOverrides".to_string(), to_json(sidecar_overrides)),
            ("ComputeResources".to_string(), to_json(compute_resources)),
        ])
    }
}

// Only used for types made of strings, JSON values and string-keyed maps,
// which always serialize.
fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskRunResult {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub result_type: Option<String>,
    pub value: ParamValue,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigSource {
    pub uri: String,
    pub digest: BTreeMap<String, String>,
    pub entry_point: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_source: Option<ConfigSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_flags: Option<Value>,
}

/// State of a step or sidecar container once the run completed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerState {
    pub name: String,
    #[serde(rename = "imageID")]
    pub image_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskRunStatus {
    pub start_time: Option<DateTime<FixedOffset>>,
    pub completion_time: Option<DateTime<FixedOffset>>,
    pub task_spec: Option<TaskSpec>,
    #[serde(alias = "taskRunResults")]
    pub task_results: Vec<TaskRunResult>,
    pub provenance: Option<Provenance>,
    pub steps: Vec<ContainerState>,
    pub sidecars: Vec<ContainerState>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunRecord {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: TaskRunSpec,
    pub status: TaskRunStatus,
}

impl RunRecord {
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }

    /// The object-kind identifier, e.g. `tekton.dev/v1beta1/TaskRun`.
    pub fn gvk(&self) -> String {
        format!("{}/{}", self.api_version, self.kind)
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.metadata.labels
    }

    pub fn results(&self) -> &[TaskRunResult] {
        &self.status.task_results
    }

    pub fn config_source(&self) -> Option<&ConfigSource> {
        self.status
            .provenance
            .as_ref()
            .and_then(|p| p.config_source.as_ref())
    }
}

/// Reads a run record from a `.json`, `.yaml` or `.yml` file.
pub fn load_run_record(path: &Path) -> Result<RunRecord> {
    let data = fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("yaml") | Some("yml") => RunRecord::from_yaml(&data),
        Some("json") | None => RunRecord::from_json(&data),
        Some(other) => Err(Error::Validation(format!(
            "Unsupported run record format '.{other}'. Valid options are: json, yaml, yml"
        ))),
    }
}
