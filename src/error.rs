use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Which of the on-disk artifacts an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Model,
    Scaler,
    Encoder,
    Meta,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactKind::Model => "model",
            ArtifactKind::Scaler => "scaler",
            ArtifactKind::Encoder => "location encoder",
            ArtifactKind::Meta => "meta",
        };
        f.write_str(s)
    }
}

/// Startup failures. Any of these aborts the process.
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("{kind} artifact not found at {}", path.display())]
    Missing { kind: ArtifactKind, path: PathBuf },

    #[error("failed to read {kind} artifact at {}", path.display())]
    Io {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} artifact at {} is corrupt: {reason}", path.display())]
    Corrupt {
        kind: ArtifactKind,
        path: PathBuf,
        reason: String,
    },

    #[error("{kind} artifact disagrees with feature schema v{version}: {detail}")]
    Schema {
        kind: ArtifactKind,
        version: u32,
        detail: String,
    },

    #[error("unsupported {kind} format at {}", path.display())]
    Unsupported { kind: ArtifactKind, path: PathBuf },
}

impl ArtifactLoadError {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactLoadError::Missing { kind, .. }
            | ArtifactLoadError::Io { kind, .. }
            | ArtifactLoadError::Corrupt { kind, .. }
            | ArtifactLoadError::Schema { kind, .. }
            | ArtifactLoadError::Unsupported { kind, .. } => *kind,
        }
    }

    pub(crate) fn schema(kind: ArtifactKind, detail: impl Into<String>) -> Self {
        ArtifactLoadError::Schema {
            kind,
            version: crate::schema::SCHEMA_VERSION,
            detail: detail.into(),
        }
    }
}

/// Per-request failures. None of these are retryable.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictError {
    #[error("unknown location {0:?}")]
    UnknownLocation(String),

    #[error("hour {0} is outside 0..=23")]
    InvalidHour(u8),

    #[error("{stage}: expected {expected} values, got {got}")]
    ShapeMismatch {
        stage: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("inference backend failed: {0}")]
    Backend(String),
}
