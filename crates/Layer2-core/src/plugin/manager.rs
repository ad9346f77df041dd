//! Plugin Manager - 플러그인 라이프사이클 서비스
//!
//! 명령 계층이 사용하는 파사드입니다. 식별자 문자열을 해석하고,
//! 세 가지 해석기(설치/자동 제거/업데이트)와 단일 플러그인 작업을
//! 레지스트리에 연결합니다.
//!
//! 모든 변경 작업은 하나의 작업 잠금 안에서 실행됩니다.

use super::autoremove::{AutoremoveOutcome, Autoremover};
use super::identifier::{ArtifactIdentifier, ManifestIdentifier};
use super::installer::{DependencyInstaller, InstallReport};
use super::registration::{LoadedPlugin, PluginRegistration};
use super::traits::PluginRegistry;
use super::updater::{UpdatePlan, UpdateResolver};
use plinth_foundation::{Error, PlinthConfig, Result, Version};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

// ============================================================================
// 결과 타입
// ============================================================================

/// `install` 결과
#[derive(Debug, Clone, Serialize)]
pub struct InstallOutcome {
    pub registration: PluginRegistration,

    /// 함께 설치된 의존성
    pub dependencies: InstallReport,

    /// 로드되었지만 아직 활성화되지 않음
    pub needs_enable: bool,
}

/// 플러그인 상세 정보
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInfo {
    pub identifier: ArtifactIdentifier,
    pub version: Version,
    pub auto_start: bool,
    pub required: bool,
    pub elevated: bool,
    pub loaded: bool,
    pub enabled: bool,
    pub dependencies: Vec<ManifestIdentifier>,
    pub dependers: Vec<ArtifactIdentifier>,
}

// ============================================================================
// PluginManager
// ============================================================================

/// 플러그인 매니저
pub struct PluginManager {
    registry: Arc<dyn PluginRegistry>,
    config: PlinthConfig,

    /// 작업 단위 상호 배제
    lock: Mutex<()>,
}

impl PluginManager {
    pub fn new(registry: Arc<dyn PluginRegistry>, config: PlinthConfig) -> Self {
        Self {
            registry,
            config,
            lock: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &Arc<dyn PluginRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &PlinthConfig {
        &self.config
    }

    /// 실행 중인 호스트 코어 시스템
    pub fn core_identifier(&self) -> ArtifactIdentifier {
        let core = &self.config.core;
        ArtifactIdentifier::new(core.package_id.clone(), core.artifact_id.clone(), core.version.clone())
    }

    // ========================================================================
    // 설치 / 제거
    // ========================================================================

    /// 의존성과 함께 설치
    pub async fn install(&self, text: &str) -> Result<InstallOutcome> {
        let _guard = self.lock.lock().await;

        let identifier = self.resolve(text).await?;
        let manifest = identifier.without_version();

        info!("Resolving dependencies for {}", identifier);
        let dependencies = self.registry.dependencies(&identifier).await?;

        let report = DependencyInstaller::new(self.registry.as_ref())
            .auto_start(self.config.auto_start_dependencies)
            .install_closure(&dependencies)
            .await?;

        if let Some(existing) = self.registry.plugin(&manifest).await? {
            if existing.installed {
                return Err(Error::InvalidInput(format!(
                    "{} is already installed with version {}",
                    manifest, existing.identifier.version
                )));
            }
        }

        info!("Installing {}", identifier);
        let registration = self.registry.install(&identifier).await?;

        let enabled = self
            .registry
            .loaded_plugin(&manifest)
            .await?
            .is_some_and(|loaded| loaded.enabled);

        Ok(InstallOutcome {
            needs_enable: registration.loaded && !enabled,
            registration,
            dependencies: report,
        })
    }

    /// 제거 (운영자 필수 플러그인은 거부)
    pub async fn uninstall(&self, text: &str) -> Result<PluginRegistration> {
        let _guard = self.lock.lock().await;

        let registration = self.installed(text).await?;
        let manifest = registration.manifest();

        if registration.required {
            return Err(Error::InvalidInput(format!("{} is required", manifest)));
        }

        info!("Uninstalling {}", registration.identifier);

        if registration.loaded {
            self.registry
                .set_enabled(&manifest, false)
                .await
                .map_err(|e| {
                    Error::Lifecycle(format!("Failed to disable {}: {}", registration.identifier, e))
                })?;
        }

        self.registry.set_auto_start(&manifest, false).await?;

        match self.registry.uninstall(&registration).await {
            Ok(_) => Ok(registration),
            Err(Error::Unsupported(_)) => Err(Error::Unsupported(format!(
                "{} does not support un-installation",
                registration.identifier
            ))),
            Err(e) => Err(e),
        }
    }

    /// 불필요한 의존성 플러그인 제거
    pub async fn autoremove(&self) -> Result<AutoremoveOutcome> {
        let _guard = self.lock.lock().await;
        Autoremover::new(self.registry.as_ref()).run().await
    }

    // ========================================================================
    // 업데이트
    // ========================================================================

    /// 업데이트 확인 (`None`이면 설치된 전체)
    pub async fn check_updates(&self, text: Option<&str>) -> Result<UpdatePlan> {
        let _guard = self.lock.lock().await;

        let registrations = match text {
            Some(text) => vec![self.registered(text).await?],
            None => self
                .registry
                .plugins()
                .await?
                .into_iter()
                .filter(|registration| registration.installed)
                .collect(),
        };

        debug!("Checking {} plugin(s) for updates", registrations.len());
        UpdateResolver::new(self.registry.as_ref(), self.core_identifier())
            .check(&registrations)
            .await
    }

    /// 확인된 업데이트 계획 적용
    pub async fn apply_updates(&self, plan: &UpdatePlan) -> Result<Vec<ArtifactIdentifier>> {
        let _guard = self.lock.lock().await;
        plan.apply(self.registry.as_ref()).await
    }

    // ========================================================================
    // 활성화
    // ========================================================================

    /// 필요하면 로드한 뒤 활성화하고 자동 시작으로 표시
    pub async fn enable(&self, text: &str) -> Result<PluginRegistration> {
        let _guard = self.lock.lock().await;

        let registration = self.registered(text).await?;
        let manifest = registration.manifest();

        let loaded = match self.registry.loaded_plugin(&manifest).await? {
            Some(loaded) => loaded,
            None => {
                info!("Loading {}", registration.identifier);
                self.registry.load(&manifest).await?
            }
        };

        if loaded.enabled && registration.auto_start {
            return Err(Error::InvalidInput(format!("{} is already enabled", manifest)));
        }

        info!("Enabling {}", registration.identifier);
        self.registry.set_enabled(&manifest, true).await?;
        self.registry.set_auto_start(&manifest, true).await?;

        self.refreshed(&manifest).await
    }

    /// 비활성화하고 자동 시작 해제
    pub async fn disable(&self, text: &str) -> Result<PluginRegistration> {
        let _guard = self.lock.lock().await;

        let loaded = self.loaded(text).await?;
        let manifest = loaded.manifest();

        if !loaded.enabled && !loaded.registration.auto_start {
            return Err(Error::InvalidInput(format!("{} is not enabled", manifest)));
        }

        info!("Disabling {}", loaded.identifier());
        self.registry.set_enabled(&manifest, false).await?;
        self.registry.set_auto_start(&manifest, false).await?;

        self.refreshed(&manifest).await
    }

    // ========================================================================
    // 운영자 플래그
    // ========================================================================

    pub async fn require(&self, text: &str) -> Result<PluginRegistration> {
        let _guard = self.lock.lock().await;

        let loaded = self.loaded(text).await?;
        let manifest = loaded.manifest();
        if loaded.registration.required {
            return Err(Error::InvalidInput(format!("{} is already required", manifest)));
        }

        self.registry.set_required(&manifest, true).await?;
        info!("{} is now required", manifest);
        self.refreshed(&manifest).await
    }

    pub async fn unrequire(&self, text: &str) -> Result<PluginRegistration> {
        let _guard = self.lock.lock().await;

        let loaded = self.loaded(text).await?;
        let manifest = loaded.manifest();
        if !loaded.registration.required {
            return Err(Error::InvalidInput(format!("{} is not required", manifest)));
        }

        self.registry.set_required(&manifest, false).await?;
        info!("{} is no longer required", manifest);
        self.refreshed(&manifest).await
    }

    pub async fn elevate(&self, text: &str) -> Result<PluginRegistration> {
        let _guard = self.lock.lock().await;

        let loaded = self.loaded(text).await?;
        let manifest = loaded.manifest();
        if loaded.registration.elevated {
            return Err(Error::InvalidInput(format!("{} is already elevated", manifest)));
        }

        self.registry.set_elevated(&manifest, true).await?;
        info!("{} is now elevated", manifest);
        self.refreshed(&manifest).await
    }

    pub async fn unelevate(&self, text: &str) -> Result<PluginRegistration> {
        let _guard = self.lock.lock().await;

        let loaded = self.loaded(text).await?;
        let manifest = loaded.manifest();
        if !loaded.registration.elevated {
            return Err(Error::InvalidInput(format!("{} is not elevated", manifest)));
        }

        self.registry.set_elevated(&manifest, false).await?;
        info!("{} is no longer elevated", manifest);
        self.refreshed(&manifest).await
    }

    // ========================================================================
    // 속성
    // ========================================================================

    pub async fn set_property(&self, text: &str, name: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;

        let registration = self.registered(text).await?;
        self.registry
            .set_property(&registration.manifest(), name, Some(value.to_string()))
            .await?;

        info!("Property changed for {}: {} -> {:?}", registration.identifier, name, value);
        Ok(())
    }

    pub async fn unset_property(&self, text: &str, name: &str) -> Result<()> {
        let _guard = self.lock.lock().await;

        let registration = self.registered(text).await?;
        if registration.property(name).is_none() {
            return Err(Error::InvalidInput(format!(
                "Property {} is not set for {}",
                name,
                registration.manifest()
            )));
        }

        self.registry
            .set_property(&registration.manifest(), name, None)
            .await?;

        info!("Property unset for {}: {}", registration.identifier, name);
        Ok(())
    }

    pub async fn property(&self, text: &str, name: &str) -> Result<Option<String>> {
        let registration = self.registered(text).await?;
        Ok(registration.properties.get(name).cloned())
    }

    pub async fn properties(&self, text: &str) -> Result<BTreeMap<String, String>> {
        Ok(self.registered(text).await?.properties)
    }

    // ========================================================================
    // 정보
    // ========================================================================

    /// 로드된 플러그인 목록 (이름순, 같은 이름은 패키지순)
    pub async fn list(&self) -> Result<Vec<LoadedPlugin>> {
        let mut plugins = self.registry.loaded_plugins().await?;
        plugins.sort_by(|a, b| {
            let (a, b) = (&a.registration.identifier, &b.registration.identifier);
            a.artifact_id
                .cmp(&b.artifact_id)
                .then_with(|| a.package_id.cmp(&b.package_id))
        });
        Ok(plugins)
    }

    pub async fn info(&self, text: &str) -> Result<PluginInfo> {
        let registration = self.registered(text).await?;
        let loaded = self.registry.loaded_plugin(&registration.manifest()).await?;

        let (enabled, dependencies, dependers) = match loaded {
            Some(loaded) => (
                loaded.enabled,
                loaded.dependencies,
                loaded
                    .dependers
                    .into_iter()
                    .map(|depender| depender.identifier)
                    .collect(),
            ),
            None => (false, Vec::new(), Vec::new()),
        };

        Ok(PluginInfo {
            version: registration.identifier.version.clone(),
            identifier: registration.identifier,
            auto_start: registration.auto_start,
            required: registration.required,
            elevated: registration.elevated,
            loaded: registration.loaded,
            enabled,
            dependencies,
            dependers,
        })
    }

    // ========================================================================
    // 식별자 해석
    // ========================================================================

    async fn resolve(&self, text: &str) -> Result<ArtifactIdentifier> {
        self.registry
            .resolve_identifier(text)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("Plugin {} not found, or no versions are available", text))
            })
    }

    /// 등록 정보 (없으면 `NotFound`)
    async fn registered(&self, text: &str) -> Result<PluginRegistration> {
        let manifest = self.resolve(text).await?.without_version();
        self.registry
            .plugin(&manifest)
            .await?
            .ok_or_else(|| Error::NotFound(format!("{} is not installed", manifest)))
    }

    /// 설치된 등록 정보
    async fn installed(&self, text: &str) -> Result<PluginRegistration> {
        let registration = self.registered(text).await?;
        if !registration.installed {
            return Err(Error::NotFound(format!("{} is not installed", registration.manifest())));
        }
        Ok(registration)
    }

    /// 로드된 인스턴스 (로드되지 않았으면 `InvalidInput`)
    async fn loaded(&self, text: &str) -> Result<LoadedPlugin> {
        let manifest = self.registered(text).await?.manifest();
        self.registry
            .loaded_plugin(&manifest)
            .await?
            .ok_or_else(|| Error::InvalidInput(format!("{} is not loaded", manifest)))
    }

    async fn refreshed(&self, manifest: &ManifestIdentifier) -> Result<PluginRegistration> {
        self.registry
            .plugin(manifest)
            .await?
            .ok_or_else(|| Error::NotFound(format!("{} is not installed", manifest)))
    }
}
