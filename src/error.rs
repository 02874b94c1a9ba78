//! Unified error type for the mutator crate.
//!
//! Every failure that can happen before or during `init` is represented
//! here. Nothing on the hot path (stream/instruction/compressed mutation)
//! returns a `Result`: by construction, all bounds and schema lookups
//! needed to mutate a buffer are resolved once at load time.

use thiserror::Error;

/// Errors surfaced while loading configuration or an ISA schema.
#[derive(Debug, Error)]
pub enum MutatorError {
    /// Malformed config or schema: missing file, invalid YAML, an
    /// unresolved `extends`/`include`, an unknown format or field, a
    /// fixed-field value wider than its field, an invalid integer
    /// literal, or an out-of-range probability.
    #[error("config error in {path}: {message}")]
    Config {
        /// File (or synthetic location, e.g. "MUTATOR_CONFIG") the
        /// offending key was read from.
        path: String,
        /// Human-readable description naming the offending key/value.
        message: String,
    },

    /// A required environment variable was not set at init.
    #[error("missing required environment variable: {var}")]
    Env {
        /// Name of the missing variable.
        var: &'static str,
    },

    /// The debug/runtime log file could not be opened. Non-fatal: the
    /// caller downgrades to stderr or a null sink instead of failing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for failures that don't cleanly fit `Config`/`Env`/`Io`
    /// (e.g. a host-ABI glue failure surfaced before a session exists).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MutatorError {
    /// Build a [`MutatorError::Config`] naming `path` and `message`.
    pub fn config(path: impl Into<String>, message: impl Into<String>) -> Self {
        MutatorError::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the loader and config modules.
pub type Result<T> = std::result::Result<T, MutatorError>;
