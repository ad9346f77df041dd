//! Update Resolver - 호환 가능한 최신 버전 계산
//!
//! 각 후보 버전을 높은 것부터 검사하고, PROVIDED 제약을 모두 만족하는
//! 첫 번째 후보를 선택합니다.
//! - 호스트 코어 대상: 선언된 버전 <= 실행 중인 코어 버전
//! - 그 외 대상: 대상의 최적 버전 >= 선언된 버전 (재귀)

use super::artifact::{Artifact, ArtifactDependency};
use super::identifier::{ArtifactIdentifier, ManifestIdentifier};
use super::registration::PluginRegistration;
use super::traits::{ArtifactRepository, PluginRegistry};
use futures::future::BoxFuture;
use plinth_foundation::{Error, Result, Version};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

// ============================================================================
// UpdatePlan
// ============================================================================

/// 업데이트 계획 (매니페스트 → 목표 버전)
///
/// `apply`를 호출하기 전까지는 아무것도 변경되지 않습니다.
/// JSON으로는 `{"package:artifact": "version"}` 객체가 됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdatePlan {
    #[serde(serialize_with = "serialize_updates")]
    updates: BTreeMap<ManifestIdentifier, Version>,
}

fn serialize_updates<S: Serializer>(
    updates: &BTreeMap<ManifestIdentifier, Version>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(
        updates
            .iter()
            .map(|(manifest, version)| (manifest.to_string(), version)),
    )
}

impl UpdatePlan {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn get(&self, identifier: &ManifestIdentifier) -> Option<&Version> {
        self.updates.get(identifier)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ManifestIdentifier, &Version)> {
        self.updates.iter()
    }

    /// 목표 아티팩트 ID 목록
    pub fn identifiers(&self) -> Vec<ArtifactIdentifier> {
        self.updates
            .iter()
            .map(|(manifest, version)| manifest.with_version(version.clone()))
            .collect()
    }

    /// 각 등록 정보에 새 버전 기록 (다음 로드 시 적용)
    pub async fn apply(&self, registry: &dyn PluginRegistry) -> Result<Vec<ArtifactIdentifier>> {
        let mut applied = Vec::with_capacity(self.updates.len());

        for (manifest, version) in &self.updates {
            registry.set_version(manifest, version.clone()).await?;
            info!("Updated {} to {}", manifest, version);
            applied.push(manifest.with_version(version.clone()));
        }

        Ok(applied)
    }
}

// ============================================================================
// UpdateResolver
// ============================================================================

/// 한 번의 검사 동안만 유지되는 업데이트 계산기
pub struct UpdateResolver<'a> {
    registry: &'a dyn PluginRegistry,
    repository: Arc<dyn ArtifactRepository>,

    /// 호스트 코어 시스템 (실행 중인 버전 포함)
    core: ArtifactIdentifier,

    /// 이번 검사에서 계산된 최적 버전
    cache: HashMap<ManifestIdentifier, Version>,

    /// 계산 중인 매니페스트 체인
    in_progress: Vec<ManifestIdentifier>,
}

impl<'a> UpdateResolver<'a> {
    pub fn new(registry: &'a dyn PluginRegistry, core: ArtifactIdentifier) -> Self {
        Self {
            repository: registry.repository(),
            registry,
            core,
            cache: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    /// 설치된 버전보다 높은 최적 버전을 가진 매니페스트 계산
    pub async fn check(mut self, registrations: &[PluginRegistration]) -> Result<UpdatePlan> {
        for registration in registrations {
            let artifact = self.backing_artifact(&registration.identifier).await?;
            self.best_version(artifact).await?;
        }

        let mut plan = UpdatePlan::default();
        for (manifest, best) in self.cache {
            let Some(live) = self.registry.plugin(&manifest).await? else {
                continue;
            };

            if best > live.identifier.version {
                debug!("Update available for {}: {} -> {}", manifest, live.identifier.version, best);
                plan.updates.insert(manifest, best);
            }
        }

        Ok(plan)
    }

    /// 로드된 인스턴스의 아티팩트, 없으면 저장소에서 조회
    async fn backing_artifact(&self, identifier: &ArtifactIdentifier) -> Result<Artifact> {
        if let Some(loaded) = self.registry.loaded_plugin(&identifier.without_version()).await? {
            return Ok(loaded.artifact);
        }

        self.repository.artifact(identifier).await
    }

    /// 아티팩트 매니페스트의 최적 버전 (등록되지 않았으면 `None`)
    fn best_version(&mut self, artifact: Artifact) -> BoxFuture<'_, Result<Option<Version>>> {
        Box::pin(async move {
            let manifest = artifact.identifier().without_version();

            let Some(registration) = self.registry.plugin(&manifest).await? else {
                debug!("{} is not registered", manifest);
                return Ok(None);
            };

            if let Some(cached) = self.cache.get(&manifest) {
                return Ok(Some(cached.clone()));
            }

            if self.in_progress.contains(&manifest) {
                return Err(Error::DependencyCycle(self.cycle_chain(&manifest)));
            }

            self.in_progress.push(manifest.clone());
            let chosen = self.first_compatible(&artifact).await;
            self.in_progress.pop();

            let best = chosen?.unwrap_or(registration.identifier.version);
            self.cache.insert(manifest, best.clone());
            Ok(Some(best))
        })
    }

    /// 높은 버전부터 검사해 모든 제약을 통과하는 첫 후보
    async fn first_compatible(&mut self, artifact: &Artifact) -> Result<Option<Version>> {
        let manifest = artifact.identifier().without_version();

        for candidate in artifact.manifest().versions_newer_than(artifact.version()) {
            let candidate_id = manifest.with_version(candidate.clone());
            let candidate_artifact = match self.repository.artifact(&candidate_id).await {
                Ok(found) => found,
                Err(e) => {
                    debug!("Skipping candidate {}: {}", candidate_id, e);
                    continue;
                }
            };

            let constraints: Vec<ArtifactDependency> =
                candidate_artifact.provided_dependencies().cloned().collect();

            let mut compatible = true;
            for constraint in &constraints {
                if !self.constraint_holds(constraint).await? {
                    debug!("Candidate {} rejected by {}", candidate_id, constraint.child);
                    compatible = false;
                    break;
                }
            }

            if compatible {
                return Ok(Some(candidate));
            }
        }

        Ok(None)
    }

    async fn constraint_holds(&mut self, constraint: &ArtifactDependency) -> Result<bool> {
        let target = constraint.child.without_version();

        if target == self.core.without_version() {
            return Ok(constraint.child.version <= self.core.version);
        }

        let Some(registration) = self.registry.plugin(&target).await? else {
            return Ok(false);
        };

        let artifact = match self.backing_artifact(&registration.identifier).await {
            Ok(artifact) => artifact,
            Err(e) => {
                debug!("Cannot resolve provided target {}: {}", registration.identifier, e);
                return Ok(false);
            }
        };

        Ok(match self.best_version(artifact).await? {
            Some(best) => best >= constraint.child.version,
            None => false,
        })
    }

    fn cycle_chain(&self, manifest: &ManifestIdentifier) -> String {
        let start = self
            .in_progress
            .iter()
            .position(|entry| entry == manifest)
            .unwrap_or(0);

        self.in_progress[start..]
            .iter()
            .chain(std::iter::once(manifest))
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_serializes_with_string_keys() {
        let mut plan = UpdatePlan::default();
        plan.updates.insert(
            ManifestIdentifier::new("io.acme", "chat"),
            Version::parse("2.0").unwrap(),
        );
        plan.updates.insert(
            ManifestIdentifier::new("io.acme", "net"),
            Version::parse("1.1.3").unwrap(),
        );

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "updates": {
                    "io.acme:chat": "2.0",
                    "io.acme:net": "1.1.3"
                }
            })
        );
    }
}
