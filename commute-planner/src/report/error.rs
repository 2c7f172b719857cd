//! Report error types.

use std::path::PathBuf;

/// Errors writing or reading report outputs.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to render report: {0}")]
    Render(#[from] askama::Error),

    #[error("failed to encode map data: {0}")]
    MapData(#[from] serde_json::Error),

    /// The PDF converter could not be started
    #[error("failed to run {program}: {source}")]
    PdfSpawn {
        program: String,
        source: std::io::Error,
    },

    /// The PDF converter ran but reported failure
    #[error("{program} failed ({status}): {stderr}")]
    PdfFailed {
        program: String,
        status: String,
        stderr: String,
    },
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}
