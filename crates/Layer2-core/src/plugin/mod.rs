//! # Plugin System
//!
//! 버전이 있는 아티팩트로 배포되는 플러그인의 라이프사이클 관리
//!
//! ## 개요
//!
//! - 설치: 전이적 의존성을 깊이 우선으로 설치 (required/optional 정책)
//! - 자동 제거: 아무도 필요로 하지 않는 의존성 플러그인을 고정점까지 제거
//! - 업데이트: PROVIDED 제약을 만족하는 가장 높은 버전 계산
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     PluginManager                           │
//! │  ┌──────────────────┬────────────────┬──────────────────┐  │
//! │  │DependencyInstaller│  Autoremover   │  UpdateResolver  │  │
//! │  └──────────────────┴────────────────┴──────────────────┘  │
//! │                          │                                  │
//! │  ┌───────────────────────┼───────────────────────────────┐ │
//! │  │  PluginRegistry  ──── ArtifactRepository              │ │
//! │  │  (InMemoryRegistry / 외부 구현)                        │ │
//! │  └───────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! 코어는 상태를 소유하지 않습니다. 레지스트리 스냅샷을 읽고,
//! 변경은 레지스트리 작업으로만 수행합니다.
//!
//! ## 예시
//!
//! ```ignore
//! let repository = Arc::new(InMemoryRepository::new());
//! let registry = Arc::new(InMemoryRegistry::new(repository));
//! let manager = PluginManager::new(registry, PlinthConfig::load()?);
//!
//! let outcome = manager.install("io.acme:chat").await?;
//! let plan = manager.check_updates(None).await?;
//! manager.apply_updates(&plan).await?;
//! ```

mod artifact;
mod autoremove;
mod identifier;
mod installer;
mod manager;
mod memory;
mod registration;
mod traits;
mod updater;

pub use artifact::{Artifact, ArtifactDependency, ArtifactManifest, DependencyLevel};
pub use autoremove::{AutoremoveOutcome, Autoremover};
pub use identifier::{ArtifactIdentifier, ManifestIdentifier};
pub use installer::{DependencyInstaller, InstallReport, SkippedDependency};
pub use manager::{InstallOutcome, PluginInfo, PluginManager};
pub use memory::{InMemoryRegistry, InMemoryRepository};
pub use registration::{LoadedPlugin, PluginKind, PluginRegistration, RuntimeDepender};
pub use traits::{ArtifactRepository, PluginRegistry};
pub use updater::{UpdatePlan, UpdateResolver};
