//! PDF export through an external `wkhtmltopdf` binary.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, instrument};

use super::error::ReportError;

pub const DEFAULT_PDF_PROGRAM: &str = "wkhtmltopdf";

/// Converts an HTML report into a PDF next to it.
#[derive(Debug, Clone)]
pub struct PdfExporter {
    program: PathBuf,
    /// Milliseconds to let the map script run before printing.
    javascript_delay_ms: u32,
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self::new(DEFAULT_PDF_PROGRAM)
    }
}

impl PdfExporter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            javascript_delay_ms: 2000,
        }
    }

    pub fn with_javascript_delay(mut self, ms: u32) -> Self {
        self.javascript_delay_ms = ms;
        self
    }

    /// Where the PDF for an HTML report goes: same name, `.pdf` extension.
    pub fn pdf_path_for(html: &Path) -> PathBuf {
        html.with_extension("pdf")
    }

    /// Convert `html` into `pdf`.
    #[instrument(skip(self), fields(program = %self.program.display()))]
    pub async fn export(&self, html: &Path, pdf: &Path) -> Result<(), ReportError> {
        let program = self.program.display().to_string();

        let output = Command::new(&self.program)
            .arg("--quiet")
            .arg("--enable-local-file-access")
            .arg("--javascript-delay")
            .arg(self.javascript_delay_ms.to_string())
            .arg(html)
            .arg(pdf)
            .output()
            .await
            .map_err(|source| ReportError::PdfSpawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ReportError::PdfFailed {
                program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(pdf = %pdf.display(), "PDF written");
        Ok(())
    }
}
