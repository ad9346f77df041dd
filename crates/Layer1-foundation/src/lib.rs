//! # plinth-foundation
//!
//! Foundation layer for Plinth:
//! - Version: 비교 가능한 아티팩트 버전
//! - Error: 공통 에러 타입과 `Result`
//! - Config: 통합 설정 (PlinthConfig, 글로벌 + 프로젝트 병합)
//! - Storage: JsonStore (스코프별 설정 파일)
//! - Logging: tracing subscriber 초기화

pub mod config;
pub mod error;
pub mod logging;
pub mod storage;
pub mod version;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Version
// ============================================================================
pub use version::Version;

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    CoreSystemConfig, CoreSystemLayer, PlinthConfig, PlinthConfigLayer, PLINTH_CONFIG_FILE,
};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::{ConfigScope, JsonStore};

// ============================================================================
// Logging
// ============================================================================
pub use logging::{init_tracing, try_init_tracing};
