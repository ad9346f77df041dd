//! In-memory registry - 메모리에 상태를 보관하는 레지스트리/저장소 구현
//!
//! 테스트와 상태를 메모리에 두는 임베더를 위한 참조 구현입니다.
//! 실패 주입 (설치/로드/라이프사이클/제거 금지/등록 정보 저장, 저장소 장애)과
//! 조회 횟수 집계를 지원합니다.

use super::artifact::{Artifact, ArtifactDependency, ArtifactManifest, DependencyLevel};
use super::identifier::{ArtifactIdentifier, ManifestIdentifier};
use super::registration::{LoadedPlugin, PluginKind, PluginRegistration, RuntimeDepender};
use super::traits::{ArtifactRepository, PluginRegistry};
use async_trait::async_trait;
use plinth_foundation::{Error, Result, Version};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

// ============================================================================
// InMemoryRepository
// ============================================================================

#[derive(Debug, Clone)]
struct Release {
    kind: PluginKind,
    dependencies: Vec<ArtifactDependency>,
}

/// 메모리 아티팩트 저장소
#[derive(Default)]
pub struct InMemoryRepository {
    releases: RwLock<HashMap<ManifestIdentifier, BTreeMap<Version, Release>>>,

    /// 조회 시 `Repository` 에러를 내는 아티팩트
    unavailable: RwLock<HashSet<ArtifactIdentifier>>,

    /// 아티팩트별 조회 횟수 (실패 포함)
    fetches: RwLock<HashMap<ArtifactIdentifier, usize>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 운영자가 직접 설치하는 플러그인 릴리스 등록
    pub async fn publish(&self, identifier: ArtifactIdentifier, dependencies: Vec<ArtifactDependency>) {
        self.insert(identifier, PluginKind::Explicit, dependencies).await;
    }

    /// 다른 플러그인을 위한 의존성 릴리스 등록
    pub async fn publish_dependency(
        &self,
        identifier: ArtifactIdentifier,
        dependencies: Vec<ArtifactDependency>,
    ) {
        self.insert(identifier, PluginKind::Dependency, dependencies).await;
    }

    async fn insert(&self, identifier: ArtifactIdentifier, kind: PluginKind, dependencies: Vec<ArtifactDependency>) {
        debug!("Publishing {} ({:?})", identifier, kind);

        let mut releases = self.releases.write().await;
        releases
            .entry(identifier.without_version())
            .or_default()
            .insert(identifier.version, Release { kind, dependencies });
    }

    /// 저장소 장애 주입
    pub async fn make_unavailable(&self, identifier: ArtifactIdentifier) {
        self.unavailable.write().await.insert(identifier);
    }

    /// 가장 높은 버전
    pub async fn latest(&self, manifest: &ManifestIdentifier) -> Option<ArtifactIdentifier> {
        let releases = self.releases.read().await;
        releases
            .get(manifest)
            .and_then(|versions| versions.keys().next_back())
            .map(|version| manifest.with_version(version.clone()))
    }

    /// `artifact` 조회 횟수
    pub async fn fetches(&self, identifier: &ArtifactIdentifier) -> usize {
        self.fetches.read().await.get(identifier).copied().unwrap_or(0)
    }

    pub async fn manifests(&self) -> Vec<ManifestIdentifier> {
        self.releases.read().await.keys().cloned().collect()
    }

    /// 릴리스의 플러그인 분류
    pub async fn kind(&self, identifier: &ArtifactIdentifier) -> Option<PluginKind> {
        let releases = self.releases.read().await;
        releases
            .get(&identifier.without_version())
            .and_then(|versions| versions.get(&identifier.version))
            .map(|release| release.kind)
    }

    async fn contains(&self, identifier: &ArtifactIdentifier) -> bool {
        self.kind(identifier).await.is_some()
    }
}

#[async_trait]
impl ArtifactRepository for InMemoryRepository {
    async fn artifact(&self, identifier: &ArtifactIdentifier) -> Result<Artifact> {
        *self.fetches.write().await.entry(identifier.clone()).or_default() += 1;

        if self.unavailable.read().await.contains(identifier) {
            return Err(Error::Repository(format!("{} is unavailable", identifier)));
        }

        let manifest = identifier.without_version();
        let releases = self.releases.read().await;
        let versions = releases
            .get(&manifest)
            .ok_or_else(|| Error::NotFound(format!("Artifact {} not found", manifest)))?;

        let (version, release) = versions
            .get_key_value(&identifier.version)
            .ok_or_else(|| Error::NotFound(format!("Artifact {} not found", identifier)))?;

        Ok(Artifact::new(
            manifest.with_version(version.clone()),
            ArtifactManifest::new(manifest.clone(), versions.keys().cloned().collect()),
            release.dependencies.clone(),
        ))
    }
}

// ============================================================================
// InMemoryRegistry
// ============================================================================

struct Instance {
    artifact: Artifact,
    enabled: bool,
}

struct Entry {
    registration: PluginRegistration,
    kind: PluginKind,

    /// 현재 등록된 버전의 아티팩트
    artifact: Artifact,

    instance: Option<Instance>,
}

#[derive(Default)]
struct Failures {
    install: HashSet<ManifestIdentifier>,
    load: HashSet<ManifestIdentifier>,
    lifecycle: HashSet<ManifestIdentifier>,
    uninstall: HashSet<ManifestIdentifier>,
    persist: HashSet<ManifestIdentifier>,
}

#[derive(Default)]
struct RegistryState {
    entries: BTreeMap<ManifestIdentifier, Entry>,
    failures: Failures,
}

impl RegistryState {
    fn entry(&self, identifier: &ManifestIdentifier) -> Result<&Entry> {
        self.entries
            .get(identifier)
            .ok_or_else(|| Error::NotFound(format!("{} is not installed", identifier)))
    }

    fn entry_mut(&mut self, identifier: &ManifestIdentifier) -> Result<&mut Entry> {
        self.entries
            .get_mut(identifier)
            .ok_or_else(|| Error::NotFound(format!("{} is not installed", identifier)))
    }

    /// 로드된 인스턴스의 스냅샷
    fn snapshot(&self, identifier: &ManifestIdentifier) -> Option<LoadedPlugin> {
        let entry = self.entries.get(identifier)?;
        let instance = entry.instance.as_ref()?;

        let dependencies = instance
            .artifact
            .dependencies()
            .iter()
            .filter(|dep| dep.level == DependencyLevel::Normal)
            .map(|dep| dep.child.without_version())
            .filter(|child| {
                self.entries
                    .get(child)
                    .is_some_and(|other| other.instance.is_some())
            })
            .collect();

        let mut dependers = Vec::new();
        let mut artifact_dependers = Vec::new();
        for (other_id, other) in &self.entries {
            if other_id == identifier {
                continue;
            }

            if let Some(other_instance) = &other.instance {
                for dep in other_instance.artifact.dependencies() {
                    if dep.level == DependencyLevel::Normal && &dep.child.without_version() == identifier {
                        dependers.push(RuntimeDepender {
                            identifier: other.registration.identifier.clone(),
                            requires: dep.required,
                        });
                    }
                }
            }

            artifact_dependers.extend(
                other
                    .artifact
                    .dependencies()
                    .iter()
                    .filter(|dep| {
                        dep.level == DependencyLevel::Normal && &dep.child.without_version() == identifier
                    })
                    .cloned(),
            );
        }

        let mut registration = entry.registration.clone();
        registration.loaded = true;

        Some(LoadedPlugin {
            registration,
            artifact: instance.artifact.clone(),
            enabled: instance.enabled,
            kind: entry.kind,
            dependencies,
            dependers,
            artifact_dependers,
        })
    }
}

/// 메모리 플러그인 레지스트리
pub struct InMemoryRegistry {
    repository: Arc<InMemoryRepository>,
    state: RwLock<RegistryState>,
}

impl InMemoryRegistry {
    pub fn new(repository: Arc<InMemoryRepository>) -> Self {
        Self {
            repository,
            state: RwLock::new(RegistryState::default()),
        }
    }

    pub fn artifacts(&self) -> Arc<InMemoryRepository> {
        Arc::clone(&self.repository)
    }

    /// 설치되지 않은 등록 기록 추가
    pub async fn record(&self, identifier: &ArtifactIdentifier) -> Result<()> {
        let artifact = self.repository.artifact(identifier).await?;
        let kind = self
            .repository
            .kind(identifier)
            .await
            .unwrap_or(PluginKind::Explicit);

        let mut registration = PluginRegistration::new(identifier.clone());
        registration.installed = false;

        let mut state = self.state.write().await;
        state.entries.insert(
            identifier.without_version(),
            Entry {
                registration,
                kind,
                artifact,
                instance: None,
            },
        );
        Ok(())
    }

    // ========================================================================
    // 실패 주입
    // ========================================================================

    pub async fn fail_install(&self, identifier: ManifestIdentifier) {
        self.state.write().await.failures.install.insert(identifier);
    }

    pub async fn fail_load(&self, identifier: ManifestIdentifier) {
        self.state.write().await.failures.load.insert(identifier);
    }

    pub async fn fail_lifecycle(&self, identifier: ManifestIdentifier) {
        self.state.write().await.failures.lifecycle.insert(identifier);
    }

    pub async fn forbid_uninstall(&self, identifier: ManifestIdentifier) {
        self.state.write().await.failures.uninstall.insert(identifier);
    }

    /// 설치 후 등록 정보 변경(set_*)이 실패하도록
    pub async fn fail_persist(&self, identifier: ManifestIdentifier) {
        self.state.write().await.failures.persist.insert(identifier);
    }

    /// 저장된 등록 정보 변경
    async fn update<F>(&self, identifier: &ManifestIdentifier, f: F) -> Result<()>
    where
        F: FnOnce(&mut PluginRegistration) + Send,
    {
        let mut state = self.state.write().await;
        if state.failures.persist.contains(identifier) {
            return Err(Error::Repository(format!(
                "Cannot persist registration of {}",
                identifier
            )));
        }

        let entry = state.entry_mut(identifier)?;
        f(&mut entry.registration);
        Ok(())
    }

    async fn resolve_manifest(&self, manifest: &ManifestIdentifier) -> Option<ArtifactIdentifier> {
        {
            let state = self.state.read().await;
            if let Some(entry) = state.entries.get(manifest) {
                return Some(entry.registration.identifier.clone());
            }
        }

        self.repository.latest(manifest).await
    }
}

#[async_trait]
impl PluginRegistry for InMemoryRegistry {
    async fn resolve_identifier(&self, text: &str) -> Result<Option<ArtifactIdentifier>> {
        if let Ok(identifier) = text.parse::<ArtifactIdentifier>() {
            let known = self.repository.contains(&identifier).await;
            return Ok(known.then_some(identifier));
        }

        if let Ok(manifest) = text.parse::<ManifestIdentifier>() {
            return Ok(self.resolve_manifest(&manifest).await);
        }

        // 아티팩트 이름만 주어진 경우 (유일할 때만)
        let name = text.trim();
        let mut candidates: HashSet<ManifestIdentifier> = self
            .repository
            .manifests()
            .await
            .into_iter()
            .filter(|manifest| manifest.artifact_id == name)
            .collect();
        {
            let state = self.state.read().await;
            candidates.extend(
                state
                    .entries
                    .keys()
                    .filter(|manifest| manifest.artifact_id == name)
                    .cloned(),
            );
        }

        if candidates.len() != 1 {
            debug!("Identifier {:?} matched {} manifests", text, candidates.len());
            return Ok(None);
        }

        match candidates.into_iter().next() {
            Some(manifest) => Ok(self.resolve_manifest(&manifest).await),
            None => Ok(None),
        }
    }

    async fn is_installed(&self, identifier: &ArtifactIdentifier) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .get(&identifier.without_version())
            .is_some_and(|entry| entry.registration.installed))
    }

    async fn plugin(&self, identifier: &ManifestIdentifier) -> Result<Option<PluginRegistration>> {
        let state = self.state.read().await;
        Ok(state.entries.get(identifier).map(|entry| {
            let mut registration = entry.registration.clone();
            registration.loaded = entry.instance.is_some();
            registration
        }))
    }

    async fn plugins(&self) -> Result<Vec<PluginRegistration>> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .values()
            .map(|entry| {
                let mut registration = entry.registration.clone();
                registration.loaded = entry.instance.is_some();
                registration
            })
            .collect())
    }

    async fn loaded_plugins(&self) -> Result<Vec<LoadedPlugin>> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .keys()
            .filter_map(|identifier| state.snapshot(identifier))
            .collect())
    }

    async fn loaded_plugin(&self, identifier: &ManifestIdentifier) -> Result<Option<LoadedPlugin>> {
        Ok(self.state.read().await.snapshot(identifier))
    }

    async fn dependencies(&self, identifier: &ArtifactIdentifier) -> Result<Vec<ArtifactDependency>> {
        let artifact = self.repository.artifact(identifier).await.map_err(|e| {
            Error::Repository(format!("Failed to resolve dependencies for {}: {}", identifier, e))
        })?;

        Ok(artifact.dependencies().to_vec())
    }

    fn repository(&self) -> Arc<dyn ArtifactRepository> {
        self.repository.clone()
    }

    async fn install(&self, identifier: &ArtifactIdentifier) -> Result<PluginRegistration> {
        let manifest = identifier.without_version();
        if self.state.read().await.failures.install.contains(&manifest) {
            return Err(Error::Load(format!("Failed to install {}", identifier)));
        }

        let artifact = self
            .repository
            .artifact(identifier)
            .await
            .map_err(|e| Error::Load(format!("Failed to install {}: {}", identifier, e)))?;
        let kind = self
            .repository
            .kind(identifier)
            .await
            .unwrap_or(PluginKind::Explicit);

        let mut registration = PluginRegistration::new(artifact.identifier().clone());
        registration.loaded = true;

        let mut state = self.state.write().await;
        state.entries.insert(
            manifest,
            Entry {
                registration: registration.clone(),
                kind,
                artifact: artifact.clone(),
                instance: Some(Instance {
                    artifact,
                    enabled: false,
                }),
            },
        );

        info!("Installed {}", registration.identifier);
        Ok(registration)
    }

    async fn uninstall(&self, registration: &PluginRegistration) -> Result<bool> {
        let manifest = registration.manifest();
        let mut state = self.state.write().await;

        if state.failures.uninstall.contains(&manifest) {
            return Err(Error::Unsupported(format!(
                "{} does not support uninstallation",
                registration.identifier
            )));
        }

        let removed = state.entries.remove(&manifest).is_some();
        if removed {
            info!("Uninstalled {}", registration.identifier);
        }
        Ok(removed)
    }

    async fn load(&self, identifier: &ManifestIdentifier) -> Result<LoadedPlugin> {
        let target = {
            let state = self.state.read().await;
            let entry = state.entry(identifier)?;
            if !entry.registration.installed {
                return Err(Error::NotFound(format!("{} is not installed", identifier)));
            }
            if state.failures.load.contains(identifier) {
                return Err(Error::Load(format!("Failed to load {}", identifier)));
            }
            if let Some(loaded) = state.snapshot(identifier) {
                return Ok(loaded);
            }
            entry.registration.identifier.clone()
        };

        let artifact = self
            .repository
            .artifact(&target)
            .await
            .map_err(|e| Error::Load(format!("Failed to load {}: {}", target, e)))?;

        let mut state = self.state.write().await;
        let entry = state.entry_mut(identifier)?;
        entry.artifact = artifact.clone();
        entry.registration.loaded = true;
        entry.instance = Some(Instance {
            artifact,
            enabled: false,
        });

        debug!("Loaded {}", target);
        state
            .snapshot(identifier)
            .ok_or_else(|| Error::Internal(format!("{} vanished while loading", identifier)))
    }

    async fn set_auto_start(&self, identifier: &ManifestIdentifier, auto_start: bool) -> Result<()> {
        self.update(identifier, |registration| registration.auto_start = auto_start)
            .await
    }

    async fn set_required(&self, identifier: &ManifestIdentifier, required: bool) -> Result<()> {
        self.update(identifier, |registration| registration.required = required)
            .await
    }

    async fn set_elevated(&self, identifier: &ManifestIdentifier, elevated: bool) -> Result<()> {
        self.update(identifier, |registration| registration.elevated = elevated)
            .await
    }

    async fn set_property(
        &self,
        identifier: &ManifestIdentifier,
        name: &str,
        value: Option<String>,
    ) -> Result<()> {
        let name = name.to_string();
        self.update(identifier, move |registration| match value {
            Some(value) => {
                registration.properties.insert(name, value);
            }
            None => {
                registration.properties.remove(&name);
            }
        })
        .await
    }

    async fn set_version(&self, identifier: &ManifestIdentifier, version: Version) -> Result<()> {
        self.update(identifier, |registration| registration.identifier.version = version)
            .await
    }

    async fn set_enabled(&self, identifier: &ManifestIdentifier, enabled: bool) -> Result<()> {
        let mut state = self.state.write().await;
        if state.failures.lifecycle.contains(identifier) {
            return Err(Error::Lifecycle(format!(
                "{} refused to change state",
                identifier
            )));
        }

        let entry = state.entry_mut(identifier)?;
        let instance = entry
            .instance
            .as_mut()
            .ok_or_else(|| Error::Lifecycle(format!("{} is not loaded", identifier)))?;

        instance.enabled = enabled;
        debug!("{} enabled = {}", identifier, enabled);
        Ok(())
    }
}
