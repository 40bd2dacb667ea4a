use crate::adapters::Context;
use crate::error::{Error, Result};
use crate::in_toto::STATEMENT_IN_TOTO_V01;
use crate::resolvers::{ResultSubjectExtractor, RunMaterialResolver};
use crate::run_record::{ParamValue, TaskRunResult};
use crate::slsa::{
    BuildConfig, Material, PREDICATE_SLSA_PROVENANCE, SchemaVersion, StatementFactory,
};
use crate::tests::common::{
    MockMaterialResolver, MockSubjectExtractor, sample_run, subjects,
};
use serde_json::json;
use std::error::Error as _;
use std::sync::atomic::Ordering;

const BUILDER_ID: &str = "https://tekton.dev/chains/v2";

fn materials() -> Vec<Material> {
    vec![
        Material::new("oci://gcr.io/kaniko", "sha256", "01"),
        Material::new("git+https://github.com/org/app.git", "sha1", "02"),
    ]
}

// Mirrors the documented example: reproducible label, one param, one
// result and a config source.
#[test]
fn test_v2_example_scenario() -> Result<()> {
    let run = sample_run();
    let extractor = MockSubjectExtractor::new(subjects(&["registry.local/app"]));
    let resolver = MockMaterialResolver::new(materials());

    let statement = StatementFactory::new(&extractor, &resolver).generate_attestation(
        &Context::background(),
        BUILDER_ID,
        SchemaVersion::V2,
        &run,
    )?;

    assert_eq!(statement.statement_type, STATEMENT_IN_TOTO_V01);
    assert_eq!(statement.predicate_type, PREDICATE_SLSA_PROVENANCE);

    let predicate = &statement.predicate;
    assert_eq!(predicate.builder.id, BUILDER_ID);
    assert_eq!(
        predicate.build_type,
        "https://chains.tekton.dev/format/slsa/v2alpha1/type/tekton.dev/v1beta1/TaskRun"
    );
    assert!(predicate.metadata.reproducible);

    let source = predicate.invocation.config_source.as_ref().unwrap();
    assert_eq!(source.uri, "git+https://x");
    assert_eq!(source.digest["sha1"], "deadbeef");
    assert_eq!(source.entry_point, "build.sh");

    match &predicate.build_config {
        BuildConfig::V2(config) => {
            assert_eq!(
                config.task_run_results[0],
                TaskRunResult {
                    name: "digest".to_string(),
                    result_type: None,
                    value: ParamValue::from("sha256:abc"),
                }
            );
            assert_eq!(config.task_spec, run.status.task_spec);
        }
        other => panic!("expected v2 build config, got {other:?}"),
    }

    assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_v1_and_v2_differ_only_where_expected() -> Result<()> {
    let run = sample_run();
    let extractor = MockSubjectExtractor::new(subjects(&["a"]));
    let resolver = MockMaterialResolver::new(materials());
    let factory = StatementFactory::new(&extractor, &resolver);
    let ctx = Context::background();

    let v1 = factory.generate_attestation(&ctx, BUILDER_ID, SchemaVersion::V1, &run)?;
    let v2 = factory.generate_attestation(&ctx, BUILDER_ID, SchemaVersion::V2, &run)?;

    assert_eq!(v1.predicate_type, v2.predicate_type);
    assert_ne!(v1.predicate.build_type, v2.predicate.build_type);
    assert_eq!(v1.predicate.build_type, "tekton.dev/v1beta1/TaskRun");

    assert!(matches!(v1.predicate.build_config, BuildConfig::V1(Some(_))));
    assert!(matches!(v2.predicate.build_config, BuildConfig::V2(_)));
    assert_eq!(v1.predicate.schema_version(), SchemaVersion::V1);
    assert_eq!(v2.predicate.schema_version(), SchemaVersion::V2);

    assert_eq!(v1.subject, v2.subject);
    assert_eq!(v1.predicate.materials, v2.predicate.materials);
    assert_eq!(v1.predicate.metadata, v2.predicate.metadata);

    // v1 never records where the task definition came from
    assert!(v1.predicate.invocation.config_source.is_none());
    assert!(v2.predicate.invocation.config_source.is_some());
    Ok(())
}

#[test]
fn test_v1_invocation_parameters_and_environment() -> Result<()> {
    let run = sample_run();
    let extractor = MockSubjectExtractor::default();
    let resolver = MockMaterialResolver::default();

    let statement = StatementFactory::new(&extractor, &resolver).generate_attestation(
        &Context::background(),
        BUILDER_ID,
        SchemaVersion::V1,
        &run,
    )?;

    let invocation = &statement.predicate.invocation;
    assert_eq!(invocation.parameters["IMAGE"], json!("x"));
    assert_eq!(invocation.parameters["DOCKERFILE"], json!("./Dockerfile"));

    let environment = invocation.environment.as_ref().unwrap();
    assert_eq!(environment["labels"]["app"], "web");
    assert_eq!(environment["annotations"].len(), 1);
    assert_eq!(environment["annotations"]["team"], "platform");
    Ok(())
}

#[test]
fn test_v2_parameters_never_contain_task_fields() -> Result<()> {
    let mut run = sample_run();
    run.spec.task_spec = run.status.task_spec.clone();
    let extractor = MockSubjectExtractor::default();
    let resolver = MockMaterialResolver::default();

    let statement = StatementFactory::new(&extractor, &resolver).generate_attestation(
        &Context::background(),
        BUILDER_ID,
        SchemaVersion::V2,
        &run,
    )?;

    let parameters = &statement.predicate.invocation.parameters;
    assert!(!parameters.contains_key("TaskRef"));
    assert!(!parameters.contains_key("TaskSpec"));
    assert_eq!(parameters["ServiceAccountName"], json!("builder"));
    assert!(statement.predicate.invocation.environment.is_none());
    Ok(())
}

#[test]
fn test_material_failure_aborts_generation() {
    let run = sample_run();
    let extractor = MockSubjectExtractor::new(subjects(&["a"]));
    let resolver = MockMaterialResolver::failing("registry unreachable");

    for version in [SchemaVersion::V1, SchemaVersion::V2] {
        let result = StatementFactory::new(&extractor, &resolver).generate_attestation(
            &Context::background(),
            BUILDER_ID,
            version,
            &run,
        );

        match result {
            Err(err @ Error::MaterialsUnresolved(_)) => {
                assert_eq!(err.source().unwrap().to_string(), "registry unreachable");
            }
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("generation should fail when materials are unresolved"),
        }
    }
}

#[test]
fn test_empty_materials_and_subjects_are_allowed() -> Result<()> {
    let run = sample_run();
    let extractor = MockSubjectExtractor::default();
    let resolver = MockMaterialResolver::default();

    let statement = StatementFactory::new(&extractor, &resolver).generate_attestation(
        &Context::background(),
        BUILDER_ID,
        SchemaVersion::V2,
        &run,
    )?;

    assert!(statement.subject.is_empty());
    assert!(statement.predicate.materials.is_empty());
    Ok(())
}

#[test]
fn test_adapter_order_and_duplicates_preserved() -> Result<()> {
    let run = sample_run();
    let mut subject_list = subjects(&["z", "a", "m"]);
    subject_list.push(subject_list[0].clone());
    let mut material_list = materials();
    material_list.insert(0, material_list[1].clone());

    let extractor = MockSubjectExtractor::new(subject_list.clone());
    let resolver = MockMaterialResolver::new(material_list.clone());

    let statement = StatementFactory::new(&extractor, &resolver).generate_attestation(
        &Context::background(),
        BUILDER_ID,
        SchemaVersion::V1,
        &run,
    )?;

    assert_eq!(statement.subject, subject_list);
    assert_eq!(statement.predicate.materials, material_list);
    Ok(())
}

#[test]
fn test_metadata_in_utc() -> Result<()> {
    let run = sample_run();
    let extractor = MockSubjectExtractor::default();
    let resolver = MockMaterialResolver::default();

    let statement = StatementFactory::new(&extractor, &resolver).generate_attestation(
        &Context::background(),
        BUILDER_ID,
        SchemaVersion::V2,
        &run,
    )?;

    let value = serde_json::to_value(&statement)?;
    assert_eq!(value["predicate"]["metadata"]["buildStartedOn"], "2023-05-01T10:00:00Z");
    assert_eq!(value["predicate"]["metadata"]["buildFinishedOn"], "2023-05-01T10:05:30Z");
    assert_eq!(value["predicate"]["metadata"]["reproducible"], true);
    Ok(())
}

#[test]
fn test_missing_timestamps_are_omitted() -> Result<()> {
    let mut run = sample_run();
    run.status.start_time = None;
    run.status.completion_time = None;
    run.metadata.labels.clear();
    let extractor = MockSubjectExtractor::default();
    let resolver = MockMaterialResolver::default();

    let statement = StatementFactory::new(&extractor, &resolver).generate_attestation(
        &Context::background(),
        BUILDER_ID,
        SchemaVersion::V1,
        &run,
    )?;

    let metadata = serde_json::to_value(&statement.predicate.metadata)?;
    assert!(metadata.get("buildStartedOn").is_none());
    assert!(metadata.get("buildFinishedOn").is_none());
    assert_eq!(metadata["reproducible"], false);
    Ok(())
}

#[test]
fn test_statement_json_round_trips() -> Result<()> {
    let run = sample_run();
    let extractor = MockSubjectExtractor::new(subjects(&["a"]));
    let resolver = MockMaterialResolver::new(materials());
    let factory = StatementFactory::new(&extractor, &resolver);

    for version in [SchemaVersion::V1, SchemaVersion::V2] {
        let statement =
            factory.generate_attestation(&Context::background(), BUILDER_ID, version, &run)?;

        let json = serde_json::to_string(&statement)?;
        let decoded: crate::slsa::ProvenanceStatement = serde_json::from_str(&json)?;
        assert_eq!(decoded, statement);
    }
    Ok(())
}

#[test]
fn test_result_based_adapters_end_to_end() -> Result<()> {
    let run = sample_run();

    let statement = StatementFactory::new(&ResultSubjectExtractor, &RunMaterialResolver)
        .generate_attestation(&Context::background(), BUILDER_ID, SchemaVersion::V2, &run)?;

    assert_eq!(statement.subject.len(), 1);
    assert_eq!(statement.subject[0].name, "registry.local/app");
    assert_eq!(statement.subject[0].digest["sha256"], "abc");

    let uris: Vec<_> = statement
        .predicate
        .materials
        .iter()
        .map(|m| m.uri.as_str())
        .collect();
    assert_eq!(
        uris,
        [
            "git+https://x",
            "oci://gcr.io/kaniko-project/executor",
            "git+https://github.com/org/app.git",
        ]
    );
    Ok(())
}

#[test]
fn test_factory_is_shareable_across_threads() -> Result<()> {
    let run = sample_run();
    let extractor = MockSubjectExtractor::new(subjects(&["a"]));
    let resolver = MockMaterialResolver::new(materials());
    let factory = StatementFactory::new(&extractor, &resolver);

    let statements: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = [SchemaVersion::V1, SchemaVersion::V2]
            .into_iter()
            .map(|version| {
                let factory = &factory;
                let run = &run;
                scope.spawn(move || {
                    factory.generate_attestation(&Context::background(), BUILDER_ID, version, run)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("generation thread panicked"))
            .collect()
    });

    assert_eq!(statements.len(), 2);
    for statement in statements {
        assert_eq!(statement?.subject.len(), 1);
    }
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);
    Ok(())
}
