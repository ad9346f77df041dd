//! Error types for Plinth
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Plinth 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 아티팩트 저장소 관련
    // ========================================================================
    #[error("Repository error: {0}")]
    Repository(String),

    // ========================================================================
    // 플러그인 설치/로드 관련
    // ========================================================================
    #[error("Load error: {0}")]
    Load(String),

    /// 의존성 설치 실패 (부모/자식 체인 포함)
    #[error("Failed to load dependency {child} for {parent}: {source}")]
    DependencyLoad {
        child: String,
        parent: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Dependency cycle detected: {0}")]
    DependencyCycle(String),

    // ========================================================================
    // 플러그인 라이프사이클 관련
    // ========================================================================
    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    // ========================================================================
    // 일반
    // ========================================================================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 사용자에게 보여줄 수 있는 에러인지 확인
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::InvalidInput(_) | Error::Unsupported(_)
        )
    }

    /// 선택적(optional) 의존성에서 경고로 격하될 수 있는 에러인지 확인
    ///
    /// 사이클과 라이프사이클 에러는 항상 치명적입니다.
    pub fn is_optional_downgradable(&self) -> bool {
        match self {
            Error::Repository(_) | Error::Load(_) | Error::NotFound(_) | Error::Io(_) => true,
            Error::DependencyLoad { source, .. } => source.is_optional_downgradable(),
            _ => false,
        }
    }

    /// 의존성 로드 에러 생성 헬퍼
    pub fn dependency_load(
        child: impl std::fmt::Display,
        parent: impl std::fmt::Display,
        source: Error,
    ) -> Self {
        Error::DependencyLoad {
            child: child.to_string(),
            parent: parent.to_string(),
            source: Box::new(source),
        }
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
