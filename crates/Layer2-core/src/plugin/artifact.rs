//! Artifact - 해석된 아티팩트 메타데이터와 의존성 엣지

use super::identifier::{ArtifactIdentifier, ManifestIdentifier};
use plinth_foundation::Version;
use serde::{Deserialize, Serialize};

// ============================================================================
// DependencyLevel
// ============================================================================

/// 의존성 레벨
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyLevel {
    /// 설치가 필요한 일반 의존성
    #[default]
    Normal,

    /// API 호환성 제약 (설치 대상 아님)
    Provided,
}

// ============================================================================
// ArtifactDependency
// ============================================================================

/// 아티팩트 → 아티팩트 방향 엣지
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactDependency {
    /// 의존하는 쪽
    pub parent: ArtifactIdentifier,

    /// 의존 대상 (PROVIDED면 요구 버전)
    pub child: ArtifactIdentifier,

    /// 필수 의존성 여부
    pub required: bool,

    /// 의존성 레벨
    pub level: DependencyLevel,
}

impl ArtifactDependency {
    /// 필수 일반 의존성
    pub fn required(parent: ArtifactIdentifier, child: ArtifactIdentifier) -> Self {
        Self {
            parent,
            child,
            required: true,
            level: DependencyLevel::Normal,
        }
    }

    /// 선택적 일반 의존성
    pub fn optional(parent: ArtifactIdentifier, child: ArtifactIdentifier) -> Self {
        Self {
            parent,
            child,
            required: false,
            level: DependencyLevel::Normal,
        }
    }

    /// PROVIDED 호환성 제약
    pub fn provided(parent: ArtifactIdentifier, child: ArtifactIdentifier) -> Self {
        Self {
            parent,
            child,
            required: true,
            level: DependencyLevel::Provided,
        }
    }

    pub fn is_provided(&self) -> bool {
        self.level == DependencyLevel::Provided
    }
}

// ============================================================================
// ArtifactManifest
// ============================================================================

/// 하나의 package+artifact에 대해 알려진 모든 버전
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub identifier: ManifestIdentifier,
    pub versions: Vec<Version>,
}

impl ArtifactManifest {
    pub fn new(identifier: ManifestIdentifier, versions: Vec<Version>) -> Self {
        Self {
            identifier,
            versions,
        }
    }

    /// `version`보다 엄격히 큰 버전들 (내림차순, 중복 제거)
    pub fn versions_newer_than(&self, version: &Version) -> Vec<Version> {
        let mut newer: Vec<Version> = self
            .versions
            .iter()
            .filter(|candidate| *candidate > version)
            .cloned()
            .collect();

        newer.sort_by(|a, b| b.cmp(a));
        newer.dedup();
        newer
    }
}

// ============================================================================
// Artifact
// ============================================================================

/// 특정 버전의 해석된 메타데이터
///
/// 의존성 목록은 한 번 가져오면 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    identifier: ArtifactIdentifier,
    manifest: ArtifactManifest,
    dependencies: Vec<ArtifactDependency>,
}

impl Artifact {
    pub fn new(
        identifier: ArtifactIdentifier,
        manifest: ArtifactManifest,
        dependencies: Vec<ArtifactDependency>,
    ) -> Self {
        Self {
            identifier,
            manifest,
            dependencies,
        }
    }

    pub fn identifier(&self) -> &ArtifactIdentifier {
        &self.identifier
    }

    pub fn version(&self) -> &Version {
        &self.identifier.version
    }

    pub fn manifest(&self) -> &ArtifactManifest {
        &self.manifest
    }

    pub fn dependencies(&self) -> &[ArtifactDependency] {
        &self.dependencies
    }

    /// PROVIDED 레벨 의존성만
    pub fn provided_dependencies(&self) -> impl Iterator<Item = &ArtifactDependency> {
        self.dependencies.iter().filter(|dep| dep.is_provided())
    }
}
