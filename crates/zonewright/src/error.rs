//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with help text and
//! a stable exit code.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use zonewright_config::ConfigError;
use zonewright_core::{CoreError, ExecError, StoreError};

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const STORE: i32 = 4;
    pub const IO: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file not found: {}", .path.display())]
    #[diagnostic(
        code(zonewright::no_config),
        help(
            "Pass an existing file with --config, or omit it to use the default location.\n\
             Run: zonewright config path"
        )
    )]
    NoConfig { path: PathBuf },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(zonewright::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(
        code(zonewright::config),
        help("Check the settings file and ZONEWRIGHT_* environment variables.")
    )]
    Config(ConfigError),

    // ── Domain store ─────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(zonewright::store),
        help("The domain store is set with [store] path in the settings file.")
    )]
    Store(StoreError),

    // ── External tools ───────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(zonewright::exec))]
    Exec(ExecError),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error("Cannot write {}", .path.display())]
    #[diagnostic(
        code(zonewright::io),
        help("Check that the output directories exist and are writable.")
    )]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Cannot render output: {0}")]
    #[diagnostic(code(zonewright::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => exit_code::USAGE,
            Self::NoConfig { .. } | Self::Config(_) => exit_code::CONFIG,
            Self::Store(_) => exit_code::STORE,
            Self::Write { .. } | Self::Io(_) => exit_code::IO,
            Self::Exec(_) | Self::Render(_) => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => Self::NoConfig { path },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Store(err) => Self::Store(err),
            CoreError::Io { path, source } => Self::Write { path, source },
            CoreError::Exec(err) => Self::Exec(err),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Render(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_map_to_config_exit_code() {
        let err = CliError::from(ConfigError::NotFound {
            path: PathBuf::from("/nope.toml"),
        });
        assert_eq!(err.exit_code(), exit_code::CONFIG);
    }

    #[test]
    fn config_validation_is_a_usage_error() {
        let err = CliError::from(ConfigError::Validation {
            field: "dkim.adsp_policy".into(),
            reason: "out of range".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn core_io_maps_to_io_exit_code() {
        let err = CliError::from(CoreError::Io {
            path: PathBuf::from("/etc/bind/froxlor_bind.conf"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });
        assert_eq!(err.exit_code(), exit_code::IO);
    }

    #[test]
    fn store_errors_map_to_store_exit_code() {
        let err = CliError::from(CoreError::Store(StoreError::UnknownDomain { id: 3 }));
        assert_eq!(err.exit_code(), exit_code::STORE);
        assert_ne!(exit_code::SUCCESS, exit_code::STORE);
    }
}
