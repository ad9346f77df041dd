//! 자동 제거 통합 테스트
//!
//! `cargo test -p plinth-core --test autoremove_test`

mod common;

use common::{id, manifest, optional, requires, setup};
use plinth_core::{AutoremoveOutcome, Autoremover, Error, PluginRegistry};

#[tokio::test]
async fn test_autoremove_is_idempotent() {
    let (repository, registry) = setup();
    repository.publish_dependency(id("io.acme:lib:1.0"), vec![]).await;
    registry.install(&id("io.acme:lib:1.0")).await.unwrap();

    let first = Autoremover::new(registry.as_ref()).run().await.unwrap();
    assert_eq!(first, AutoremoveOutcome::Removed(vec![manifest("io.acme:lib")]));

    let second = Autoremover::new(registry.as_ref()).run().await.unwrap();
    assert_eq!(second, AutoremoveOutcome::NothingToDo);
    assert!(second.removed().is_empty());
}

#[tokio::test]
async fn test_chain_is_removed_in_one_run() {
    let (repository, registry) = setup();

    // app -> b -> c
    repository
        .publish(id("io.acme:app:1.0"), vec![requires("io.acme:app:1.0", "io.acme:b:1.0")])
        .await;
    repository
        .publish_dependency(id("io.acme:b:1.0"), vec![requires("io.acme:b:1.0", "io.acme:c:1.0")])
        .await;
    repository.publish_dependency(id("io.acme:c:1.0"), vec![]).await;

    registry.install(&id("io.acme:c:1.0")).await.unwrap();
    registry.install(&id("io.acme:b:1.0")).await.unwrap();
    let app = registry.install(&id("io.acme:app:1.0")).await.unwrap();

    let outcome = Autoremover::new(registry.as_ref()).run().await.unwrap();
    assert_eq!(outcome, AutoremoveOutcome::NothingToDo);

    registry.uninstall(&app).await.unwrap();

    let outcome = Autoremover::new(registry.as_ref()).run().await.unwrap();
    assert_eq!(
        outcome,
        AutoremoveOutcome::Removed(vec![manifest("io.acme:b"), manifest("io.acme:c")])
    );
    assert!(registry.loaded_plugins().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_operator_required_and_explicit_are_kept() {
    let (repository, registry) = setup();
    repository.publish_dependency(id("io.acme:lib:1.0"), vec![]).await;
    repository.publish(id("io.acme:app:1.0"), vec![]).await;

    registry.install(&id("io.acme:lib:1.0")).await.unwrap();
    registry.install(&id("io.acme:app:1.0")).await.unwrap();
    registry.set_required(&manifest("io.acme:lib"), true).await.unwrap();

    let outcome = Autoremover::new(registry.as_ref()).run().await.unwrap();
    assert_eq!(outcome, AutoremoveOutcome::NothingToDo);
    assert!(registry.is_installed(&id("io.acme:lib:1.0")).await.unwrap());
    assert!(registry.is_installed(&id("io.acme:app:1.0")).await.unwrap());
}

#[tokio::test]
async fn test_optional_depender_does_not_block() {
    let (repository, registry) = setup();
    repository
        .publish(id("io.acme:app:1.0"), vec![optional("io.acme:app:1.0", "io.acme:lib:1.0")])
        .await;
    repository.publish_dependency(id("io.acme:lib:1.0"), vec![]).await;

    registry.install(&id("io.acme:lib:1.0")).await.unwrap();
    registry.install(&id("io.acme:app:1.0")).await.unwrap();

    let outcome = Autoremover::new(registry.as_ref()).run().await.unwrap();
    assert_eq!(outcome.removed(), &[manifest("io.acme:lib")]);
}

#[tokio::test]
async fn test_uninstalled_depender_does_not_block() {
    let (repository, registry) = setup();
    repository
        .publish(id("io.acme:app:1.0"), vec![requires("io.acme:app:1.0", "io.acme:lib:1.0")])
        .await;
    repository.publish_dependency(id("io.acme:lib:1.0"), vec![]).await;

    registry.install(&id("io.acme:lib:1.0")).await.unwrap();
    // 설치되지 않은 등록 기록만 존재
    registry.record(&id("io.acme:app:1.0")).await.unwrap();

    let lib = registry.loaded_plugin(&manifest("io.acme:lib")).await.unwrap().unwrap();
    assert_eq!(lib.artifact_dependers.len(), 1);

    let outcome = Autoremover::new(registry.as_ref()).run().await.unwrap();
    assert_eq!(outcome.removed(), &[manifest("io.acme:lib")]);
}

#[tokio::test]
async fn test_disable_failure_is_fatal() {
    let (repository, registry) = setup();
    repository.publish_dependency(id("io.acme:lib:1.0"), vec![]).await;
    registry.install(&id("io.acme:lib:1.0")).await.unwrap();
    registry.fail_lifecycle(manifest("io.acme:lib")).await;

    let result = Autoremover::new(registry.as_ref()).run().await;
    match result {
        Err(Error::Lifecycle(message)) => assert!(message.contains("io.acme:lib:1.0")),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(registry.is_installed(&id("io.acme:lib:1.0")).await.unwrap());
}

#[tokio::test]
async fn test_forbidden_uninstall_is_surfaced() {
    let (repository, registry) = setup();
    repository.publish_dependency(id("io.acme:lib:1.0"), vec![]).await;
    registry.install(&id("io.acme:lib:1.0")).await.unwrap();
    registry.forbid_uninstall(manifest("io.acme:lib")).await;

    let result = Autoremover::new(registry.as_ref()).run().await;
    assert!(matches!(result, Err(Error::Unsupported(_))));
}
