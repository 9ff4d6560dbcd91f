//! Core types for stagehand.
//!
//! This crate provides the pieces shared by the engine and its front ends:
//! the transfer mode, the filesystem error taxonomy and engine configuration.

mod config;
mod error;
mod mode;

pub use config::{
    DEFAULT_HISTORY_LIMIT, EngineConfig, EngineConfigBuilder, EngineConfigBuilderError,
    MAX_HISTORY_LIMIT,
};
pub use error::{ConfigError, FsError};
pub use mode::TransferMode;
