//! 업데이트 해석기 통합 테스트
//!
//! `cargo test -p plinth-core --test update_test`

mod common;

use common::{id, manifest, provided, setup, v};
use plinth_core::{
    ArtifactIdentifier, Error, InMemoryRegistry, PluginRegistration, PluginRegistry, UpdatePlan,
    UpdateResolver,
};

fn core() -> ArtifactIdentifier {
    id("io.plinth:plinth-core:2.0")
}

async fn check(registry: &InMemoryRegistry) -> plinth_core::Result<UpdatePlan> {
    let registrations: Vec<PluginRegistration> = registry.plugins().await?;
    UpdateResolver::new(registry, core()).check(&registrations).await
}

#[tokio::test]
async fn test_empty_set_has_no_updates() {
    let (_repository, registry) = setup();

    let plan = UpdateResolver::new(registry.as_ref(), core())
        .check(&[])
        .await
        .unwrap();
    assert!(plan.is_empty());
}

#[tokio::test]
async fn test_highest_version_is_chosen() {
    let (repository, registry) = setup();
    for version in ["1.0", "1.1", "2.0"] {
        repository.publish(id(&format!("io.acme:chat:{}", version)), vec![]).await;
    }
    registry.install(&id("io.acme:chat:1.0")).await.unwrap();

    let plan = check(&registry).await.unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.get(&manifest("io.acme:chat")), Some(&v("2.0")));
    assert_eq!(plan.identifiers(), vec![id("io.acme:chat:2.0")]);
}

#[tokio::test]
async fn test_never_returns_installed_or_older_version() {
    let (repository, registry) = setup();
    repository.publish(id("io.acme:chat:1.0"), vec![]).await;
    repository.publish(id("io.acme:chat:2.0"), vec![]).await;
    registry.install(&id("io.acme:chat:2.0")).await.unwrap();

    let plan = check(&registry).await.unwrap();
    assert!(plan.is_empty());
}

#[tokio::test]
async fn test_core_constraint_rejects_newer_candidate() {
    let (repository, registry) = setup();
    repository.publish(id("io.acme:chat:1.0"), vec![]).await;
    repository
        .publish(
            id("io.acme:chat:1.1"),
            vec![provided("io.acme:chat:1.1", "io.plinth:plinth-core:2.0")],
        )
        .await;
    repository
        .publish(
            id("io.acme:chat:1.2"),
            vec![provided("io.acme:chat:1.2", "io.plinth:plinth-core:2.1")],
        )
        .await;
    registry.install(&id("io.acme:chat:1.0")).await.unwrap();

    let plan = check(&registry).await.unwrap();
    assert_eq!(plan.get(&manifest("io.acme:chat")), Some(&v("1.1")));
}

#[tokio::test]
async fn test_core_constraint_can_block_every_candidate() {
    let (repository, registry) = setup();
    repository.publish(id("io.acme:chat:1.0"), vec![]).await;
    repository
        .publish(
            id("io.acme:chat:1.2"),
            vec![provided("io.acme:chat:1.2", "io.plinth:plinth-core:2.1")],
        )
        .await;
    registry.install(&id("io.acme:chat:1.0")).await.unwrap();

    let plan = check(&registry).await.unwrap();
    assert!(plan.is_empty());
}

#[tokio::test]
async fn test_provided_plugin_constraint_follows_target_best_version() {
    let (repository, registry) = setup();
    repository.publish(id("io.acme:app:1.0"), vec![]).await;
    repository
        .publish(id("io.acme:app:2.0"), vec![provided("io.acme:app:2.0", "io.acme:lib:2.0")])
        .await;
    repository.publish_dependency(id("io.acme:lib:1.0"), vec![]).await;
    repository.publish_dependency(id("io.acme:lib:2.0"), vec![]).await;

    registry.install(&id("io.acme:lib:1.0")).await.unwrap();
    registry.install(&id("io.acme:app:1.0")).await.unwrap();

    // app만 검사해도 제약 대상인 lib의 업데이트가 함께 계산됨
    let app = registry.plugin(&manifest("io.acme:app")).await.unwrap().unwrap();
    let plan = UpdateResolver::new(registry.as_ref(), core())
        .check(&[app])
        .await
        .unwrap();

    assert_eq!(plan.get(&manifest("io.acme:app")), Some(&v("2.0")));
    assert_eq!(plan.get(&manifest("io.acme:lib")), Some(&v("2.0")));
}

#[tokio::test]
async fn test_unsatisfiable_provided_target_blocks_candidate() {
    let (repository, registry) = setup();
    repository.publish(id("io.acme:app:1.0"), vec![]).await;
    repository
        .publish(id("io.acme:app:2.0"), vec![provided("io.acme:app:2.0", "io.acme:lib:2.0")])
        .await;
    repository.publish_dependency(id("io.acme:lib:1.0"), vec![]).await;
    repository
        .publish_dependency(
            id("io.acme:lib:2.0"),
            vec![provided("io.acme:lib:2.0", "io.plinth:plinth-core:3.0")],
        )
        .await;

    registry.install(&id("io.acme:lib:1.0")).await.unwrap();
    registry.install(&id("io.acme:app:1.0")).await.unwrap();

    let plan = check(&registry).await.unwrap();
    assert!(plan.is_empty());
}

#[tokio::test]
async fn test_unregistered_provided_target_blocks_candidate() {
    let (repository, registry) = setup();
    repository.publish(id("io.acme:app:1.0"), vec![]).await;
    repository
        .publish(id("io.acme:app:2.0"), vec![provided("io.acme:app:2.0", "io.acme:lib:1.0")])
        .await;
    repository.publish_dependency(id("io.acme:lib:1.0"), vec![]).await;

    registry.install(&id("io.acme:app:1.0")).await.unwrap();

    let plan = check(&registry).await.unwrap();
    assert!(plan.is_empty());
}

#[tokio::test]
async fn test_unresolvable_candidate_is_skipped() {
    let (repository, registry) = setup();
    for version in ["1.0", "1.5", "2.0"] {
        repository.publish(id(&format!("io.acme:chat:{}", version)), vec![]).await;
    }
    repository.make_unavailable(id("io.acme:chat:2.0")).await;
    registry.install(&id("io.acme:chat:1.0")).await.unwrap();

    let plan = check(&registry).await.unwrap();
    assert_eq!(plan.get(&manifest("io.acme:chat")), Some(&v("1.5")));
}

#[tokio::test]
async fn test_provided_cycle_is_reported() {
    let (repository, registry) = setup();
    repository.publish(id("io.acme:a:1.0"), vec![]).await;
    repository
        .publish(id("io.acme:a:2.0"), vec![provided("io.acme:a:2.0", "io.acme:b:1.0")])
        .await;
    repository.publish(id("io.acme:b:1.0"), vec![]).await;
    repository
        .publish(id("io.acme:b:2.0"), vec![provided("io.acme:b:2.0", "io.acme:a:1.0")])
        .await;

    registry.install(&id("io.acme:a:1.0")).await.unwrap();
    registry.install(&id("io.acme:b:1.0")).await.unwrap();

    let result = check(&registry).await;
    assert!(matches!(result, Err(Error::DependencyCycle(_))));
}

#[tokio::test]
async fn test_final_comparison_uses_live_registration_version() {
    let (repository, registry) = setup();
    for version in ["1.0", "1.5", "2.0"] {
        repository.publish(id(&format!("io.acme:chat:{}", version)), vec![]).await;
    }
    registry.install(&id("io.acme:chat:1.0")).await.unwrap();

    // 등록 정보만 2.0으로 바뀌고 로드된 아티팩트는 1.0 그대로
    registry.set_version(&manifest("io.acme:chat"), v("2.0")).await.unwrap();
    let loaded = registry.loaded_plugin(&manifest("io.acme:chat")).await.unwrap().unwrap();
    assert_eq!(loaded.artifact.version(), &v("1.0"));

    let plan = check(&registry).await.unwrap();
    assert!(plan.is_empty());

    registry.set_version(&manifest("io.acme:chat"), v("1.5")).await.unwrap();
    let plan = check(&registry).await.unwrap();
    assert_eq!(plan.get(&manifest("io.acme:chat")), Some(&v("2.0")));
}

#[tokio::test]
async fn test_shared_provided_target_is_resolved_once() {
    let (repository, registry) = setup();
    repository.publish_dependency(id("io.acme:lib:1.0"), vec![]).await;
    repository.publish_dependency(id("io.acme:lib:2.0"), vec![]).await;
    for name in ["app", "web"] {
        repository.publish(id(&format!("io.acme:{}:1.0", name)), vec![]).await;
        repository
            .publish(
                id(&format!("io.acme:{}:2.0", name)),
                vec![provided(&format!("io.acme:{}:2.0", name), "io.acme:lib:2.0")],
            )
            .await;
    }

    registry.install(&id("io.acme:lib:1.0")).await.unwrap();
    registry.install(&id("io.acme:app:1.0")).await.unwrap();
    registry.install(&id("io.acme:web:1.0")).await.unwrap();

    let before = repository.fetches(&id("io.acme:lib:2.0")).await;
    let plan = check(&registry).await.unwrap();
    let fetched = repository.fetches(&id("io.acme:lib:2.0")).await - before;

    assert_eq!(fetched, 1);
    assert_eq!(plan.len(), 3);
    assert_eq!(plan.get(&manifest("io.acme:app")), Some(&v("2.0")));
    assert_eq!(plan.get(&manifest("io.acme:web")), Some(&v("2.0")));
    assert_eq!(plan.get(&manifest("io.acme:lib")), Some(&v("2.0")));
}

#[tokio::test]
async fn test_apply_writes_versions() {
    let (repository, registry) = setup();
    repository.publish(id("io.acme:chat:1.0"), vec![]).await;
    repository.publish(id("io.acme:chat:2.0"), vec![]).await;
    registry.install(&id("io.acme:chat:1.0")).await.unwrap();

    let plan = check(&registry).await.unwrap();
    let applied = plan.apply(registry.as_ref()).await.unwrap();
    assert_eq!(applied, vec![id("io.acme:chat:2.0")]);

    let registration = registry.plugin(&manifest("io.acme:chat")).await.unwrap().unwrap();
    assert_eq!(registration.identifier.version, v("2.0"));

    // 적용 후에는 더 이상 업데이트 없음
    assert!(check(&registry).await.unwrap().is_empty());
}
