//! Logging - tracing subscriber 초기화
//!
//! `RUST_LOG`가 설정되어 있으면 우선하고, 없으면 설정의 로그 레벨을 사용합니다.

use crate::{Error, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// 전역 subscriber 설치 (이미 설치되어 있으면 에러)
pub fn try_init_tracing(default_level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}

/// 전역 subscriber 설치 (이미 설치된 경우 조용히 무시)
pub fn init_tracing(default_level: &str) {
    if try_init_tracing(default_level).is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
