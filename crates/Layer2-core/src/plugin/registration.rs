//! Plugin Registration - 설치 기록과 로드된 인스턴스 스냅샷
//!
//! 레지스트리가 소유한 상태의 읽기 전용 복사본입니다.
//! 변경은 항상 `PluginRegistry`의 mutator를 통해 이루어집니다.

use super::artifact::{Artifact, ArtifactDependency};
use super::identifier::{ArtifactIdentifier, ManifestIdentifier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// PluginRegistration - 영속 설치 기록
// ============================================================================

/// 플러그인 설치 기록 (매니페스트당 하나)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginRegistration {
    /// 설치된 버전
    pub identifier: ArtifactIdentifier,

    /// 운영자가 지정한 필수 플래그 (자동 제거 / 제거 금지)
    #[serde(default)]
    pub required: bool,

    /// 권한 상승 플래그
    #[serde(default)]
    pub elevated: bool,

    /// 다음 시작 시 자동 활성화
    #[serde(default)]
    pub auto_start: bool,

    /// 문자열 속성
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    /// 설치 여부
    #[serde(default)]
    pub installed: bool,

    /// 로드 여부
    #[serde(default)]
    pub loaded: bool,

    /// 설치 시간
    pub installed_at: DateTime<Utc>,
}

impl PluginRegistration {
    /// 새로 설치된 기록 생성
    pub fn new(identifier: ArtifactIdentifier) -> Self {
        Self {
            identifier,
            required: false,
            elevated: false,
            auto_start: false,
            properties: BTreeMap::new(),
            installed: true,
            loaded: false,
            installed_at: Utc::now(),
        }
    }

    pub fn manifest(&self) -> ManifestIdentifier {
        self.identifier.without_version()
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

// ============================================================================
// PluginKind
// ============================================================================

/// 로드된 플러그인의 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginKind {
    /// 운영자가 직접 설치 (자동 제거 대상 아님)
    Explicit,

    /// 다른 플러그인을 위해 설치됨
    Dependency,
}

// ============================================================================
// RuntimeDepender
// ============================================================================

/// 런타임에 이 플러그인에 의존하는 다른 로드된 플러그인
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuntimeDepender {
    pub identifier: ArtifactIdentifier,

    /// 필수 의존 여부
    pub requires: bool,
}

// ============================================================================
// LoadedPlugin - 런타임 인스턴스 스냅샷
// ============================================================================

/// 로드된 플러그인 스냅샷
#[derive(Debug, Clone)]
pub struct LoadedPlugin {
    pub registration: PluginRegistration,
    pub artifact: Artifact,
    pub enabled: bool,
    pub kind: PluginKind,

    /// 이 플러그인이 런타임에 의존하는 플러그인
    pub dependencies: Vec<ManifestIdentifier>,

    /// 이 플러그인에 의존하는 로드된 플러그인
    pub dependers: Vec<RuntimeDepender>,

    /// 이 플러그인을 가리키는 아티팩트 엣지
    pub artifact_dependers: Vec<ArtifactDependency>,
}

impl LoadedPlugin {
    pub fn identifier(&self) -> &ArtifactIdentifier {
        &self.registration.identifier
    }

    pub fn manifest(&self) -> ManifestIdentifier {
        self.registration.manifest()
    }
}
