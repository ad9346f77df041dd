//! plinth-core: Core Runtime for Plinth
//!
//! Layer2 - 플러그인 라이프사이클 레이어
//!
//! # 주요 모듈
//!
//! - `plugin`: 식별자 모델, 레지스트리 트레이트, 의존성 설치기,
//!   자동 제거기, 업데이트 해석기, 플러그인 매니저
//!
//! # 사용 예시
//!
//! ```ignore
//! use plinth_core::{InMemoryRegistry, InMemoryRepository, PluginManager};
//! use plinth_foundation::PlinthConfig;
//!
//! let repository = Arc::new(InMemoryRepository::new());
//! let registry = Arc::new(InMemoryRegistry::new(repository));
//! let manager = PluginManager::new(registry, PlinthConfig::load()?);
//!
//! // 의존성과 함께 설치
//! let outcome = manager.install("io.acme:chat:1.0").await?;
//!
//! // 필요 없어진 의존성 정리
//! manager.autoremove().await?;
//!
//! // 업데이트 확인 후 적용
//! let plan = manager.check_updates(None).await?;
//! manager.apply_updates(&plan).await?;
//! ```

// Core modules
pub mod plugin;

// Re-exports: Foundation
pub use plinth_foundation::{Error, Result, Version};

// Re-exports: Identifiers / Artifacts
pub use plugin::{
    Artifact, ArtifactDependency, ArtifactIdentifier, ArtifactManifest, DependencyLevel,
    ManifestIdentifier,
};

// Re-exports: Registration snapshots
pub use plugin::{LoadedPlugin, PluginKind, PluginRegistration, RuntimeDepender};

// Re-exports: Traits
pub use plugin::{ArtifactRepository, PluginRegistry};

// Re-exports: Resolvers
pub use plugin::{
    AutoremoveOutcome, Autoremover, DependencyInstaller, InstallReport, SkippedDependency,
    UpdatePlan, UpdateResolver,
};

// Re-exports: In-memory
pub use plugin::{InMemoryRegistry, InMemoryRepository};

// Re-exports: Manager
pub use plugin::{InstallOutcome, PluginInfo, PluginManager};

/// 크레이트 버전
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
