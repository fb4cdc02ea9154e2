//! Configuration for the Rules Script lexer
//!
//! Compile-time limits are generated by `build.rs` from `config/<profile>.toml`.
//! Runtime preferences live in [`runtime`] and come from the environment or a TOML file.

include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

pub use runtime::{
    FileProcessorPreferences, LexicalPreferences, LogLevel, LoggingPreferences, RuntimeConfig,
    RuntimeConfigError,
};

/// Build information and configuration metadata
pub mod build_info {
    /// Profile used during build
    pub fn profile() -> &'static str {
        super::compile_time::PROFILE
    }

    /// Configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("RULES_CONFIG_DIR").unwrap_or("config")
    }

    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}
