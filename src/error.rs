use std::path::PathBuf;
use thiserror::Error;

/// Main error type for a transcode run
#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Catalogue error: {0}")]
    Catalogue(#[from] CatalogueError),

    #[error("Failed to read origin descriptor {path}: {reason}")]
    Origin { path: PathBuf, reason: String },

    #[error("Assembly error: {0}")]
    Assembly(#[from] crate::release::AssemblyError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Errors raised while probing source audio with FFmpeg
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("FFmpeg initialization failed: {0}")]
    InitFailed(String),

    #[error("Failed to open input file: {0}")]
    OpenInput(String),

    #[error("No FLAC stream in {0}")]
    NoFlacStream(String),
}

/// Errors from external tools (sox, flac2mp3, mktorrent)
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} {args} exited with {status}: {stderr}")]
    Exit {
        program: String,
        args: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("{program} did not produce {path}")]
    MissingOutput { program: String, path: PathBuf },
}

/// Errors from the remote catalogue
#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} for {action}")]
    Status {
        action: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("{action} rejected: status={status}, error={error}")]
    Rejected {
        action: &'static str,
        status: String,
        error: String,
    },

    #[error("Malformed {action} response: {reason}")]
    Malformed {
        action: &'static str,
        reason: String,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, TranscodeError>;
