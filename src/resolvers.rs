//! # Result-based Adapters
//!
//! Reference implementations of the adapter traits that read everything
//! they need from the run record itself: type-hinted task results, step
//! and sidecar image IDs, and the provenance config source.
//!
//! ## Subjects
//!
//! | Results | Subject |
//! |---|---|
//! | `IMAGE_URL` + `IMAGE_DIGEST`, `<X>_IMAGE_URL` + `<X>_IMAGE_DIGEST` | the image |
//! | `IMAGES` (comma or newline separated `name@alg:hex`) | each image |
//! | `ARTIFACT_URI` + `ARTIFACT_DIGEST`, `<X>_ARTIFACT_URI` + `<X>_ARTIFACT_DIGEST` | the artifact |
//! | object results named `*ARTIFACT_OUTPUTS` with `uri` and `digest` | the artifact |
//!
//! ## Materials
//!
//! In order: the config source, step images, sidecar images, the
//! `CHAINS-GIT_URL` + `CHAINS-GIT_COMMIT` result pair, and object results
//! named `*ARTIFACT_INPUTS`.

use crate::adapters::{Context, MaterialResolver, SubjectExtractor};
use crate::error::BoxError;
use crate::in_toto::{Subject, make_minimal_subject, parse_digest};
use crate::run_record::{ContainerState, RunRecord, TaskRunResult};
use crate::slsa::Material;

use log::warn;
use std::collections::HashSet;
use thiserror::Error;

pub const IMAGE_URL_SUFFIX: &str = "IMAGE_URL";
pub const IMAGE_DIGEST_SUFFIX: &str = "IMAGE_DIGEST";
pub const IMAGES_RESULT: &str = "IMAGES";
pub const ARTIFACT_URI_SUFFIX: &str = "ARTIFACT_URI";
pub const ARTIFACT_DIGEST_SUFFIX: &str = "ARTIFACT_DIGEST";
pub const ARTIFACT_OUTPUTS_SUFFIX: &str = "ARTIFACT_OUTPUTS";
pub const ARTIFACT_INPUTS_SUFFIX: &str = "ARTIFACT_INPUTS";
pub const GIT_URL_RESULT: &str = "CHAINS-GIT_URL";
pub const GIT_COMMIT_RESULT: &str = "CHAINS-GIT_COMMIT";

const DOCKER_PULLABLE_PREFIX: &str = "docker-pullable://";

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("malformed image ID '{image_id}' for container '{container}'")]
    MalformedImageId { container: String, image_id: String },

    #[error("result '{result}' has malformed digest '{digest}'")]
    MalformedDigest { result: String, digest: String },

    #[error("result '{result}' is missing the '{key}' field")]
    MissingField { result: String, key: &'static str },

    #[error("deadline exceeded while resolving materials")]
    DeadlineExceeded,
}

/// Extracts subjects from type-hinted results. Malformed entries are logged
/// and skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResultSubjectExtractor;

impl SubjectExtractor for ResultSubjectExtractor {
    fn extract_subjects(&self, _ctx: &Context, run: &RunRecord) -> Vec<Subject> {
        let results = run.results();
        let mut subjects = Vec::new();

        for (prefix, url) in suffixed_string_results(results, IMAGE_URL_SUFFIX) {
            let digest_name = format!("{prefix}{IMAGE_DIGEST_SUFFIX}");
            match find_string_result(results, &digest_name) {
                Some(digest) => push_subject(&mut subjects, url.trim(), digest, &digest_name),
                None => warn!("Result '{prefix}{IMAGE_URL_SUFFIX}' has no matching '{digest_name}'"),
            }
        }

        if let Some(images) = find_string_result(results, IMAGES_RESULT) {
            for reference in images.split([',', '\n']).map(str::trim).filter(|s| !s.is_empty()) {
                match reference.split_once('@') {
                    Some((name, digest)) => push_subject(&mut subjects, name, digest, IMAGES_RESULT),
                    None => warn!("Image reference '{reference}' in '{IMAGES_RESULT}' has no digest"),
                }
            }
        }

        for (prefix, uri) in suffixed_string_results(results, ARTIFACT_URI_SUFFIX) {
            let digest_name = format!("{prefix}{ARTIFACT_DIGEST_SUFFIX}");
            match find_string_result(results, &digest_name) {
                Some(digest) => push_subject(&mut subjects, uri.trim(), digest, &digest_name),
                None => warn!("Result '{prefix}{ARTIFACT_URI_SUFFIX}' has no matching '{digest_name}'"),
            }
        }

        for result in results.iter().filter(|r| r.name.ends_with(ARTIFACT_OUTPUTS_SUFFIX)) {
            match object_artifact(result) {
                Ok((uri, alg, hex)) => {
                    let subject = make_minimal_subject(uri, alg, hex);
                    if !subjects.contains(&subject) {
                        subjects.push(subject);
                    }
                }
                Err(e) => warn!("Skipping subject: {e}"),
            }
        }

        subjects
    }
}

/// Resolves materials from the run record. Any malformed input fails the
/// whole resolution.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunMaterialResolver;

impl MaterialResolver for RunMaterialResolver {
    fn resolve_materials(
        &self,
        ctx: &Context,
        run: &RunRecord,
    ) -> Result<Vec<Material>, BoxError> {
        let mut materials = MaterialSet::default();

        if let Some(source) = run.config_source() {
            if !source.uri.is_empty() && !source.digest.is_empty() {
                materials.push(Material {
                    uri: source.uri.clone(),
                    digest: source.digest.clone(),
                });
            }
        }

        for container in run.status.steps.iter().chain(&run.status.sidecars) {
            if ctx.is_expired() {
                return Err(ResolveError::DeadlineExceeded.into());
            }
            if container.image_id.is_empty() {
                continue;
            }
            materials.push(image_material(container)?);
        }

        let results = run.results();
        if let (Some(url), Some(commit)) = (
            find_string_result(results, GIT_URL_RESULT),
            find_string_result(results, GIT_COMMIT_RESULT),
        ) {
            materials.push(Material::new(&git_uri(url), "sha1", commit.trim()));
        }

        for result in results.iter().filter(|r| r.name.ends_with(ARTIFACT_INPUTS_SUFFIX)) {
            let (uri, alg, hex) = object_artifact(result)?;
            materials.push(Material::new(uri, alg, hex));
        }

        Ok(materials.into_vec())
    }
}

#[derive(Default)]
struct MaterialSet {
    seen: HashSet<(String, Vec<(String, String)>)>,
    materials: Vec<Material>,
}

impl MaterialSet {
    fn push(&mut self, material: Material) {
        let key = (
            material.uri.clone(),
            material
                .digest
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );
        if self.seen.insert(key) {
            self.materials.push(material);
        }
    }

    fn into_vec(self) -> Vec<Material> {
        self.materials
    }
}

fn find_string_result<'a>(results: &'a [TaskRunResult], name: &str) -> Option<&'a str> {
    results
        .iter()
        .find(|r| r.name == name)
        .and_then(|r| r.value.as_str())
}

/// String results named `<prefix><suffix>`, yielding the prefix and value.
fn suffixed_string_results<'a>(
    results: &'a [TaskRunResult],
    suffix: &'a str,
) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
    results.iter().filter_map(move |r| {
        let prefix = r.name.strip_suffix(suffix)?;
        if !prefix.is_empty() && !prefix.ends_with('_') {
            return None;
        }
        Some((prefix, r.value.as_str()?))
    })
}

fn push_subject(subjects: &mut Vec<Subject>, name: &str, digest: &str, result: &str) {
    match parse_digest(digest) {
        Some((alg, hex)) => {
            let subject = make_minimal_subject(name, alg, hex);
            if !subjects.contains(&subject) {
                subjects.push(subject);
            }
        }
        None => warn!("Result '{result}' has malformed digest '{digest}'"),
    }
}

fn object_artifact(result: &TaskRunResult) -> Result<(&str, &str, &str), ResolveError> {
    let fields = result.value.as_object();
    let field = |key: &'static str| {
        fields
            .and_then(|f| f.get(key))
            .map(String::as_str)
            .ok_or_else(|| ResolveError::MissingField {
                result: result.name.clone(),
                key,
            })
    };

    let uri = field("uri")?;
    let digest = field("digest")?;
    let (alg, hex) = parse_digest(digest).ok_or_else(|| ResolveError::MalformedDigest {
        result: result.name.clone(),
        digest: digest.to_string(),
    })?;

    Ok((uri, alg, hex))
}

/// `[docker-pullable://]name@alg:hex` becomes `oci://name` with its digest.
fn image_material(container: &ContainerState) -> Result<Material, ResolveError> {
    let malformed = || ResolveError::MalformedImageId {
        container: container.name.clone(),
        image_id: container.image_id.clone(),
    };

    let reference = container
        .image_id
        .strip_prefix(DOCKER_PULLABLE_PREFIX)
        .unwrap_or(&container.image_id);
    let (name, digest) = reference.split_once('@').ok_or_else(malformed)?;
    let (alg, hex) = parse_digest(digest).ok_or_else(malformed)?;
    if name.is_empty() {
        return Err(malformed());
    }

    Ok(Material::new(&format!("oci://{name}"), alg, hex))
}

fn git_uri(url: &str) -> String {
    let url = url.trim();
    if url.ends_with(".git") {
        format!("git+{url}")
    } else {
        format!("git+{url}.git")
    }
}
