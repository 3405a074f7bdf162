use std::path::PathBuf;

use unipost_schema::SchemaLoadError;

/// Failures that stop a transformation before any record is produced.
/// Per-record problems never surface here; they become field issues on the
/// record itself.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Crawler output named a platform no loaded schema covers.
    #[error("unsupported platform '{platform}'")]
    UnsupportedPlatform { platform: String },

    #[error(transparent)]
    Schema(#[from] SchemaLoadError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("transformation worker failed: {reason}")]
    Worker { reason: String },
}

/// Failures while handing validated records to a sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize record for insertion: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}

impl SinkError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
