// Error types for the downloader core and its collaborators

use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a URL into media metadata
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionError {
    /// URL is malformed, unsupported or points at nothing
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Could not reach the service (timeout, connection reset, 5xx, throttling)
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The resolver's external tool is not installed
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Resolver answered but the answer could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ResolutionError {
    /// Classify a resolver's raw error text.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("timed out")
            || lower.contains("timeout")
            || lower.contains("connection")
            || lower.contains("network is unreachable")
            || lower.contains("name resolution")
            || lower.contains("http error 429")
            || lower.contains("http error 5")
        {
            return Self::NetworkFailure(message.trim().to_string());
        }

        if lower.contains("no such file") || lower.contains("command not found") {
            return Self::ToolNotFound(message.trim().to_string());
        }

        Self::InvalidUrl(message.trim().to_string())
    }
}

/// Failure while moving stream bytes onto disk
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Fetch failed: {0}")]
    Execution(String),

    #[error("Fetcher did not report an output file")]
    MissingOutput,

    #[error("Could not move {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure of a spawned helper process
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to capture {stream} from {program}")]
    Pipe {
        program: String,
        stream: &'static str,
    },

    #[error("Timed out after {0}s")]
    TimedOut(u64),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Reader task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<ProcessError> for ResolutionError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Spawn { program, source }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Self::ToolNotFound(format!("{}: {}", program, source))
            }
            ProcessError::TimedOut(secs) => {
                Self::NetworkFailure(format!("Timed out after {}s", secs))
            }
            other => Self::classify(&other.to_string()),
        }
    }
}

impl From<ProcessError> for FetchError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Spawn { program, source }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Self::ToolNotFound(format!("{}: {}", program, source))
            }
            other => Self::Execution(other.to_string()),
        }
    }
}

/// Fatal setup failure of a playlist batch
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("could not resolve playlist: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("could not create playlist folder {path}: {source}")]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("playlist folder {0} already exists as a file")]
    FolderIsFile(PathBuf),
}
