//! Identifiers - 버전 독립 매니페스트 ID와 버전 고정 아티팩트 ID
//!
//! 텍스트 형식:
//! - `ManifestIdentifier`: `package:artifact`
//! - `ArtifactIdentifier`: `package:artifact:version`

use plinth_foundation::{Error, Result, Version};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ManifestIdentifier
// ============================================================================

/// 패키지 + 아티팩트 이름 (버전 무관)
///
/// "X가 어떤 버전이든 설치되어 있는가"를 판단하는 안정적인 키입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestIdentifier {
    pub package_id: String,
    pub artifact_id: String,
}

impl ManifestIdentifier {
    pub fn new(package_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            package_id: package_id.into(),
            artifact_id: artifact_id.into(),
        }
    }

    /// 특정 버전의 아티팩트 ID 생성
    pub fn with_version(&self, version: Version) -> ArtifactIdentifier {
        ArtifactIdentifier {
            package_id: self.package_id.clone(),
            artifact_id: self.artifact_id.clone(),
            version,
        }
    }
}

impl fmt::Display for ManifestIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.package_id, self.artifact_id)
    }
}

impl FromStr for ManifestIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match split_parts(s).as_slice() {
            [package, artifact] => Ok(Self::new(*package, *artifact)),
            _ => Err(Error::InvalidInput(format!(
                "Invalid manifest identifier {:?} (expected package:artifact)",
                s
            ))),
        }
    }
}

// ============================================================================
// ArtifactIdentifier
// ============================================================================

/// 특정 버전의 매니페스트
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactIdentifier {
    pub package_id: String,
    pub artifact_id: String,
    pub version: Version,
}

impl ArtifactIdentifier {
    pub fn new(package_id: impl Into<String>, artifact_id: impl Into<String>, version: Version) -> Self {
        Self {
            package_id: package_id.into(),
            artifact_id: artifact_id.into(),
            version,
        }
    }

    /// 소속 매니페스트 ID
    pub fn without_version(&self) -> ManifestIdentifier {
        ManifestIdentifier::new(self.package_id.clone(), self.artifact_id.clone())
    }

    pub fn version(&self) -> &Version {
        &self.version
    }
}

impl fmt::Display for ArtifactIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.package_id, self.artifact_id, self.version)
    }
}

impl FromStr for ArtifactIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match split_parts(s).as_slice() {
            [package, artifact, version] => {
                Ok(Self::new(*package, *artifact, Version::parse(version)?))
            }
            _ => Err(Error::InvalidInput(format!(
                "Invalid artifact identifier {:?} (expected package:artifact:version)",
                s
            ))),
        }
    }
}

/// 콜론으로 분리 (빈 부분이 있으면 빈 목록)
fn split_parts(s: &str) -> Vec<&str> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.iter().any(|part| part.is_empty()) {
        return Vec::new();
    }
    parts
}
