use thiserror::Error;

/// Core error type for gowalker.
///
/// Every stage of the pipeline (resolve, fetch, extract, render, persist)
/// reports through this enum so the orchestrator can classify outcomes:
/// not-modified short-circuits, not-found purges the stored package, and
/// everything else is surfaced as a failure.
///
/// # Examples
///
/// ```
/// use gowalker_core::error::{Result, WalkerError};
///
/// fn check_root(root: &str) -> Result<()> {
///     if root.is_empty() {
///         return Err(WalkerError::InvalidRemotePath(root.into()));
///     }
///     Ok(())
/// }
///
/// assert!(check_root("").is_err());
/// ```
#[derive(Error, Debug)]
pub enum WalkerError {
    /// The remote revision equals the saved one; nothing was downloaded.
    #[error("package not modified")]
    NotModified,

    #[error("{path} not found: {reason}")]
    NotFound { path: String, reason: String },

    #[error("no Go source files in {path}")]
    NoSourceFiles { path: String },

    #[error("more than one go-import meta tag found at {url}")]
    AmbiguousMeta { url: String },

    #[error("project root mismatch: {path} declares {root}, root declares {other}")]
    ProjectRootMismatch {
        path: String,
        root: String,
        other: String,
    },

    /// The path belongs to a known host but does not fit its layout.
    #[error("invalid remote path: {0}")]
    InvalidRemotePath(String),

    #[error("request to {host} failed: {source}")]
    Remote {
        host: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("failed to fetch {name}: {source}")]
    FetchFile {
        name: String,
        #[source]
        source: Box<WalkerError>,
    },

    #[error("fetching {path} timed out after {secs}s")]
    FetchTimeout { path: String, secs: u64 },

    /// The background fetch task panicked or was cancelled.
    #[error("fetch task failed: {0}")]
    Task(String),

    #[error("failed to extract documentation for {path}: {source}")]
    Extract {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("codec error: {0}")]
    Codec(String),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WalkerError {
    /// Creates a not-found error for `path`.
    pub fn not_found(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotFound {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a transport error, keeping only the host of `url` for display.
    pub fn remote(url: &str, source: reqwest::Error) -> Self {
        Self::Remote {
            host: host_of(url).to_string(),
            source,
        }
    }

    /// Returns `true` for outcomes that mean "this package does not exist
    /// (anymore)" and should purge previously stored data. A malformed path
    /// on a known host can never be fetched, so it counts too.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. }
            | Self::InvalidRemotePath(_)
            | Self::NoSourceFiles { .. }
            | Self::AmbiguousMeta { .. }
            | Self::ProjectRootMismatch { .. } => true,
            Self::HttpStatus { status, .. } => *status == 404,
            Self::FetchFile { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    pub fn is_not_modified(&self) -> bool {
        matches!(self, Self::NotModified)
    }
}

fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.split('/').next().unwrap_or(rest)
}

/// Convenience type alias for `Result<T, WalkerError>`.
pub type Result<T> = std::result::Result<T, WalkerError>;
