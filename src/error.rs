//! Error types for the simulator.
//!
//! Configuration failures are fatal at construction time; nothing here is
//! recoverable mid-run.

use std::path::PathBuf;

use thiserror::Error;

/// A problem with the supplied configuration, detected before a run starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown theory '{name}'")]
    UnknownTheory { name: String },

    #[error("unknown strategy '{name}' for theory '{theory}'")]
    UnknownStrategy { theory: String, name: String },

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration:\n{message}")]
    Invalid { message: String },
}
