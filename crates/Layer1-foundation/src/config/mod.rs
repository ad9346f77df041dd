//! Config - 통합 설정 관리
//!
//! - `plinth.rs` - PlinthConfig 통합 설정

mod plinth;

pub use plinth::{
    CoreSystemConfig, CoreSystemLayer, PlinthConfig, PlinthConfigLayer, PLINTH_CONFIG_FILE,
};
