use containers::SchemaError;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A transition tool invocation that produced no usable answer.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to launch transition tool `{path}`: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("transition tool exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    #[error("transition tool did not finish within {0:?}")]
    Timeout(Duration),

    #[error("transition tool produced malformed output: {0}")]
    MalformedOutput(String),

    #[error("transition tool i/o: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
