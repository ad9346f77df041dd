//! Plinth Config - 통합 설정
//!
//! 기본값 위에 글로벌, 프로젝트 설정 레이어를 차례로 적용하는 PlinthConfig

use crate::storage::JsonStore;
use crate::version::Version;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// 설정 파일명
pub const PLINTH_CONFIG_FILE: &str = "config.json";

// ============================================================================
// Plinth Config (통합)
// ============================================================================

/// Plinth 통합 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlinthConfig {
    /// 호스트 코어 시스템 (PROVIDED 제약의 특수 대상)
    #[serde(default)]
    pub core: CoreSystemConfig,

    /// 의존성으로 설치된 플러그인을 자동 시작으로 표시
    #[serde(default = "default_true")]
    pub auto_start_dependencies: bool,

    /// 기본 로그 레벨 (RUST_LOG가 없을 때)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for PlinthConfig {
    fn default() -> Self {
        Self {
            core: CoreSystemConfig::default(),
            auto_start_dependencies: true,
            log_level: default_log_level(),
        }
    }
}

impl PlinthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let mut config = Self::new();

        // 1. 글로벌 설정
        if let Ok(global) = JsonStore::global() {
            config.merge_from(&global)?;
        }

        // 2. 프로젝트 설정
        if let Ok(project) = JsonStore::current_project() {
            config.merge_from(&project)?;
        }

        Ok(config)
    }

    /// 특정 저장소의 설정 레이어를 병합 (파일이 없으면 그대로)
    pub fn merge_from(&mut self, store: &JsonStore) -> Result<()> {
        if let Some(layer) = store.read::<PlinthConfigLayer>(PLINTH_CONFIG_FILE)? {
            debug!("Applying {} config layer", store.scope());
            self.apply(layer);
        }
        Ok(())
    }

    /// 글로벌 설정 저장
    pub fn save_global(&self) -> Result<PathBuf> {
        JsonStore::global()?.write(PLINTH_CONFIG_FILE, self)
    }

    /// 프로젝트 설정 저장
    pub fn save_project(&self) -> Result<PathBuf> {
        JsonStore::current_project()?.write(PLINTH_CONFIG_FILE, self)
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// 레이어에 명시된 필드만 덮어씀 (기본값과 같은 값도 적용)
    pub fn apply(&mut self, layer: PlinthConfigLayer) {
        if let Some(core) = layer.core {
            self.core.apply(core);
        }
        if let Some(enabled) = layer.auto_start_dependencies {
            self.auto_start_dependencies = enabled;
        }
        if let Some(level) = layer.log_level {
            self.log_level = level;
        }
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn core(mut self, core: CoreSystemConfig) -> Self {
        self.core = core;
        self
    }

    pub fn auto_start_dependencies(mut self, enabled: bool) -> Self {
        self.auto_start_dependencies = enabled;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

// ============================================================================
// Core System Config
// ============================================================================

/// 호스트 코어 시스템 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreSystemConfig {
    /// 패키지 ID
    #[serde(default = "default_core_package")]
    pub package_id: String,

    /// 아티팩트 ID
    #[serde(default = "default_core_artifact")]
    pub artifact_id: String,

    /// 실행 중인 코어 버전
    #[serde(default = "default_core_version")]
    pub version: Version,
}

impl Default for CoreSystemConfig {
    fn default() -> Self {
        Self {
            package_id: default_core_package(),
            artifact_id: default_core_artifact(),
            version: default_core_version(),
        }
    }
}

impl CoreSystemConfig {
    pub fn new(package_id: impl Into<String>, artifact_id: impl Into<String>, version: Version) -> Self {
        Self {
            package_id: package_id.into(),
            artifact_id: artifact_id.into(),
            version,
        }
    }

    fn apply(&mut self, layer: CoreSystemLayer) {
        if let Some(package_id) = layer.package_id {
            self.package_id = package_id;
        }
        if let Some(artifact_id) = layer.artifact_id {
            self.artifact_id = artifact_id;
        }
        if let Some(version) = layer.version {
            self.version = version;
        }
    }
}

// ============================================================================
// Config Layers (파일 하나의 부분 설정)
// ============================================================================

/// 설정 파일 하나의 내용 - 생략된 필드는 아래 레이어 값을 유지
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlinthConfigLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core: Option<CoreSystemLayer>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_start_dependencies: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreSystemLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

// ============================================================================
// Helpers
// ============================================================================

fn default_core_package() -> String {
    "io.plinth".to_string()
}

fn default_core_artifact() -> String {
    "plinth-core".to_string()
}

fn default_core_version() -> Version {
    Version::parse(env!("CARGO_PKG_VERSION")).unwrap_or_default()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ConfigScope;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = PlinthConfig::new();
        assert!(config.auto_start_dependencies);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.core.package_id, "io.plinth");
        assert_eq!(config.core.artifact_id, "plinth-core");
    }

    fn write_layer(store: &JsonStore, content: &str) {
        std::fs::create_dir_all(store.base_dir()).unwrap();
        std::fs::write(store.file_path(PLINTH_CONFIG_FILE), content).unwrap();
    }

    #[test]
    fn test_layer_overrides_only_present_fields() {
        let mut config = PlinthConfig::new().log_level("debug");

        config.apply(PlinthConfigLayer {
            core: Some(CoreSystemLayer {
                version: Some(Version::new(2, 0, 0)),
                ..Default::default()
            }),
            auto_start_dependencies: Some(false),
            log_level: None,
        });

        assert_eq!(config.core.version, Version::new(2, 0, 0));
        assert_eq!(config.core.package_id, "io.plinth");
        assert!(!config.auto_start_dependencies);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_later_layer_can_restore_default_values() {
        let temp = TempDir::new().unwrap();
        let global = JsonStore::at(ConfigScope::Global, temp.path().join("global"));
        let project = JsonStore::project(temp.path());
        write_layer(&global, r#"{ "autoStartDependencies": false, "logLevel": "debug" }"#);
        write_layer(&project, r#"{ "logLevel": "info" }"#);

        let mut config = PlinthConfig::new();
        config.merge_from(&global).unwrap();
        config.merge_from(&project).unwrap();

        // 프로젝트가 생략한 필드는 글로벌 값 유지
        assert!(!config.auto_start_dependencies);
        assert_eq!(config.log_level, "info");

        write_layer(&project, r#"{ "autoStartDependencies": true }"#);
        let mut config = PlinthConfig::new();
        config.merge_from(&global).unwrap();
        config.merge_from(&project).unwrap();
        assert!(config.auto_start_dependencies);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_saved_config_reads_back_as_layer() {
        let temp = TempDir::new().unwrap();
        let store = JsonStore::project(temp.path());
        let saved = PlinthConfig::new()
            .auto_start_dependencies(false)
            .log_level("warn");
        store.write(PLINTH_CONFIG_FILE, &saved).unwrap();

        let mut config = PlinthConfig::new().log_level("trace");
        config.merge_from(&store).unwrap();
        assert_eq!(config, saved);
    }

    #[test]
    fn test_merge_from_project_file() {
        let temp = TempDir::new().unwrap();
        let store = JsonStore::project(temp.path());
        write_layer(&store, r#"{ "core": { "version": "2.0" }, "logLevel": "trace" }"#);

        let mut config = PlinthConfig::new();
        config.merge_from(&store).unwrap();

        assert_eq!(config.core.version, Version::parse("2.0").unwrap());
        assert_eq!(config.core.package_id, "io.plinth");
        assert_eq!(config.log_level, "trace");
        assert!(config.auto_start_dependencies);
    }

    #[test]
    fn test_merge_from_missing_file_is_noop() {
        let temp = TempDir::new().unwrap();
        let store = JsonStore::project(temp.path());

        let mut config = PlinthConfig::new();
        config.merge_from(&store).unwrap();
        assert_eq!(config, PlinthConfig::new());
    }
}
