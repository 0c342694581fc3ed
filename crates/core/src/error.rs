// Central Error Type for the Transport Layer

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Transport-level error type
///
/// Every failure is returned to the immediate caller; there is no internal
/// retry and no suppression beyond the unsupported-platform case in fact
/// gathering, which is `Ok(None)` rather than an error.
#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("failed to create directory {path}: {source}")]
    DirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to copy {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command {program} failed: {source}")]
    CommandIo {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Non-zero exit status. Carries whatever combined output the command
    /// produced so callers can inspect diagnostic text.
    #[error("command exited with {status}")]
    CommandFailed { status: ExitStatus, output: Vec<u8> },

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// A fact-gathering step failed; `fact` names the failing source.
    #[error("failed to gather {fact}: {source}")]
    FactGather {
        fact: &'static str,
        #[source]
        source: Box<ConnectorError>,
    },
}

impl ConnectorError {
    /// Combined output captured before a command failed, if any.
    pub fn combined_output(&self) -> Option<&[u8]> {
        match self {
            ConnectorError::CommandFailed { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Wrap a fact-gathering step failure with the failing source name.
    pub fn fact_gather(fact: &'static str, source: ConnectorError) -> Self {
        ConnectorError::FactGather {
            fact,
            source: Box::new(source),
        }
    }
}

/// Result type alias using ConnectorError
pub type Result<T> = std::result::Result<T, ConnectorError>;
