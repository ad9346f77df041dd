//! Plugin traits - 외부 협력자 인터페이스
//!
//! 코어 알고리즘은 이 두 트레이트만을 통해 상태를 읽고 변경합니다.
//! - `ArtifactRepository`: 아티팩트 메타데이터 조회
//! - `PluginRegistry`: 설치 기록과 런타임 인스턴스 관리

use super::artifact::{Artifact, ArtifactDependency};
use super::identifier::{ArtifactIdentifier, ManifestIdentifier};
use super::registration::{LoadedPlugin, PluginRegistration};
use async_trait::async_trait;
use plinth_foundation::{Result, Version};
use std::sync::Arc;

// ============================================================================
// ArtifactRepository
// ============================================================================

/// 아티팩트 저장소
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// 특정 버전의 아티팩트 조회 (없으면 `NotFound`)
    async fn artifact(&self, identifier: &ArtifactIdentifier) -> Result<Artifact>;
}

// ============================================================================
// PluginRegistry
// ============================================================================

/// 플러그인 레지스트리
///
/// 등록 정보는 호출마다 새로 가져온 스냅샷입니다.
#[async_trait]
pub trait PluginRegistry: Send + Sync {
    // ========================================================================
    // 조회
    // ========================================================================

    /// 사용자 입력을 아티팩트 ID로 해석
    async fn resolve_identifier(&self, text: &str) -> Result<Option<ArtifactIdentifier>>;

    /// 해당 매니페스트가 (어떤 버전이든) 설치되어 있는지
    async fn is_installed(&self, identifier: &ArtifactIdentifier) -> Result<bool>;

    async fn plugin(&self, identifier: &ManifestIdentifier) -> Result<Option<PluginRegistration>>;

    async fn plugins(&self) -> Result<Vec<PluginRegistration>>;

    async fn loaded_plugins(&self) -> Result<Vec<LoadedPlugin>>;

    async fn loaded_plugin(&self, identifier: &ManifestIdentifier) -> Result<Option<LoadedPlugin>>;

    /// 아티팩트의 의존성 엣지 (실패 시 `Repository`)
    async fn dependencies(&self, identifier: &ArtifactIdentifier) -> Result<Vec<ArtifactDependency>>;

    fn repository(&self) -> Arc<dyn ArtifactRepository>;

    // ========================================================================
    // 설치 / 로드
    // ========================================================================

    /// 설치 (실패 시 `Load`)
    async fn install(&self, identifier: &ArtifactIdentifier) -> Result<PluginRegistration>;

    /// 제거 (금지된 경우 `Unsupported`)
    async fn uninstall(&self, registration: &PluginRegistration) -> Result<bool>;

    /// 설치된 플러그인 로드 (실패 시 `Load`)
    async fn load(&self, identifier: &ManifestIdentifier) -> Result<LoadedPlugin>;

    // ========================================================================
    // 등록 정보 변경
    // ========================================================================

    async fn set_auto_start(&self, identifier: &ManifestIdentifier, auto_start: bool) -> Result<()>;

    async fn set_required(&self, identifier: &ManifestIdentifier, required: bool) -> Result<()>;

    async fn set_elevated(&self, identifier: &ManifestIdentifier, elevated: bool) -> Result<()>;

    /// 속성 설정 (`None`이면 제거)
    async fn set_property(
        &self,
        identifier: &ManifestIdentifier,
        name: &str,
        value: Option<String>,
    ) -> Result<()>;

    /// 다음 로드 시 사용할 버전 지정
    async fn set_version(&self, identifier: &ManifestIdentifier, version: Version) -> Result<()>;

    // ========================================================================
    // 인스턴스
    // ========================================================================

    /// 로드된 인스턴스 활성화/비활성화 (실패 시 `Lifecycle`)
    async fn set_enabled(&self, identifier: &ManifestIdentifier, enabled: bool) -> Result<()>;
}
