//! 설정 파일 저장소 - 스코프(글로벌/프로젝트)별 JSON 파일
//!
//! 설정 레이어는 파일이 없을 수 있으므로 읽기는 `Option`을 돌려줍니다.
//! 쓰기는 임시 파일에 기록한 뒤 rename 하여 반쯤 쓰인 파일이 남지 않습니다.

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 애플리케이션 디렉토리 이름
const APP_DIR: &str = "plinth";

/// 프로젝트 로컬 디렉토리 이름
const PROJECT_DIR: &str = ".plinth";

// ============================================================================
// ConfigScope
// ============================================================================

/// 설정 파일의 적용 범위 (나중 스코프가 우선)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigScope {
    /// 사용자 전역 (<config_dir>/plinth/)
    Global,

    /// 작업 디렉토리 (.plinth/)
    Project,
}

impl fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigScope::Global => write!(f, "global"),
            ConfigScope::Project => write!(f, "project"),
        }
    }
}

// ============================================================================
// JsonStore
// ============================================================================

/// 한 스코프의 JSON 설정 디렉토리
#[derive(Debug, Clone)]
pub struct JsonStore {
    scope: ConfigScope,
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn at(scope: ConfigScope, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            scope,
            base_dir: base_dir.into(),
        }
    }

    pub fn global() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Cannot find config directory".to_string()))?
            .join(APP_DIR);
        Ok(Self::at(ConfigScope::Global, dir))
    }

    pub fn project(root: impl AsRef<Path>) -> Self {
        Self::at(ConfigScope::Project, root.as_ref().join(PROJECT_DIR))
    }

    pub fn current_project() -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| Error::Config(format!("Cannot get current directory: {}", e)))?;
        Ok(Self::project(cwd))
    }

    pub fn scope(&self) -> ConfigScope {
        self.scope
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.base_dir.join(filename)
    }

    /// 설정 파일 읽기 - 파일이 없으면 None
    pub fn read<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        let path = self.file_path(filename);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No {} config at {}", self.scope, path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::Config(format!(
                    "Failed to read {} config {}: {}",
                    self.scope,
                    path.display(),
                    e
                )))
            }
        };

        let value = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Invalid {} config {}: {}",
                self.scope,
                path.display(),
                e
            ))
        })?;
        debug!("Loaded {} config from {}", self.scope, path.display());
        Ok(Some(value))
    }

    /// 설정 파일 쓰기 - 기록된 경로 반환
    pub fn write<T: Serialize>(&self, filename: &str, data: &T) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            Error::Config(format!(
                "Failed to create {}: {}",
                self.base_dir.display(),
                e
            ))
        })?;

        let mut content = serde_json::to_string_pretty(data)
            .map_err(|e| Error::Config(format!("Failed to serialize {}: {}", filename, e)))?;
        content.push('\n');

        let path = self.file_path(filename);
        let staging = self.file_path(&format!("{}.tmp", filename));
        std::fs::write(&staging, content)
            .and_then(|_| std::fs::rename(&staging, &path))
            .map_err(|e| {
                let _ = std::fs::remove_file(&staging);
                Error::Config(format!("Failed to write {}: {}", path.display(), e))
            })?;

        debug!("Saved {} config to {}", self.scope, path.display());
        Ok(path)
    }
}
