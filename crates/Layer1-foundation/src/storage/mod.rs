//! Storage module for Plinth
//!
//! - `json`: JSON - 설정 파일 저장/로드

mod json;

// JSON 설정 파일 (스코프별)
pub use json::{ConfigScope, JsonStore};
