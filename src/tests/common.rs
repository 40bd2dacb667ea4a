use crate::adapters::{Context, MaterialResolver, SubjectExtractor};
use crate::error::BoxError;
use crate::in_toto::{Subject, make_minimal_subject};
use crate::run_record::RunRecord;
use crate::slsa::Material;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A completed kaniko build with an image result, a step image, a git
/// checkout and a config source.
pub const TASKRUN_JSON: &str = r#"{
    "apiVersion": "tekton.dev/v1beta1",
    "kind": "TaskRun",
    "metadata": {
        "name": "kaniko-run",
        "namespace": "ci",
        "labels": {"chains.tekton.dev/reproducible": "true", "app": "web"},
        "annotations": {"chains.tekton.dev/signed": "true", "team": "platform"}
    },
    "spec": {
        "params": [{"name": "IMAGE", "value": "x"}],
        "serviceAccountName": "builder",
        "taskRef": {"name": "kaniko", "kind": "Task"},
        "timeout": "1h0m0s"
    },
    "status": {
        "startTime": "2023-05-01T12:00:00+02:00",
        "completionTime": "2023-05-01T12:05:30+02:00",
        "taskSpec": {
            "params": [
                {"name": "IMAGE", "type": "string"},
                {"name": "DOCKERFILE", "type": "string", "default": "./Dockerfile"}
            ],
            "steps": [{"name": "build", "image": "gcr.io/kaniko-project/executor"}]
        },
        "taskResults": [
            {"name": "digest", "value": "sha256:abc"},
            {"name": "IMAGE_URL", "value": "registry.local/app"},
            {"name": "IMAGE_DIGEST", "value": "sha256:abc"},
            {"name": "CHAINS-GIT_URL", "value": "https://github.com/org/app"},
            {"name": "CHAINS-GIT_COMMIT", "value": "0123abcd"}
        ],
        "provenance": {
            "configSource": {
                "uri": "git+https://x",
                "digest": {"sha1": "deadbeef"},
                "entryPoint": "build.sh"
            }
        },
        "steps": [
            {"name": "build", "imageID": "docker-pullable://gcr.io/kaniko-project/executor@sha256:0001"}
        ]
    }
}"#;

pub fn sample_run() -> RunRecord {
    RunRecord::from_json(TASKRUN_JSON).expect("sample task run should decode")
}

/// Returns a fixed subject list and counts how often it was asked.
#[derive(Default)]
pub struct MockSubjectExtractor {
    pub subjects: Vec<Subject>,
    pub calls: AtomicUsize,
}

impl MockSubjectExtractor {
    pub fn new(subjects: Vec<Subject>) -> Self {
        Self {
            subjects,
            calls: AtomicUsize::new(0),
        }
    }
}

impl SubjectExtractor for MockSubjectExtractor {
    fn extract_subjects(&self, _ctx: &Context, _run: &RunRecord) -> Vec<Subject> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.subjects.clone()
    }
}

/// Returns a fixed material list, or fails with `error` when set.
#[derive(Default)]
pub struct MockMaterialResolver {
    pub materials: Vec<Material>,
    pub error: Option<String>,
    pub calls: AtomicUsize,
}

impl MockMaterialResolver {
    pub fn new(materials: Vec<Material>) -> Self {
        Self {
            materials,
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Default::default()
        }
    }
}

impl MaterialResolver for MockMaterialResolver {
    fn resolve_materials(
        &self,
        _ctx: &Context,
        _run: &RunRecord,
    ) -> Result<Vec<Material>, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.error {
            Some(message) => Err(message.clone().into()),
            None => Ok(self.materials.clone()),
        }
    }
}

pub fn subjects(names: &[&str]) -> Vec<Subject> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| make_minimal_subject(name, "sha256", &format!("{i:02}")))
        .collect()
}
