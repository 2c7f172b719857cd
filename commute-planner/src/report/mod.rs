//! Report outputs: result CSV, HTML map report and PDF export.

mod error;
mod pdf;
mod record;
mod templates;

pub use error::ReportError;
pub use pdf::{DEFAULT_PDF_PROGRAM, PdfExporter};
pub use record::{
    RecordStatus, ResultRecord, read_csv, read_records, records_from_outcomes, write_csv,
    write_records,
};
pub use templates::{MapData, ReportTemplate, SummaryView, render_report};

use std::path::Path;

/// Render records to an HTML file.
pub fn write_html(
    path: impl AsRef<Path>,
    records: &[ResultRecord],
    generated_at: impl Into<String>,
) -> Result<(), ReportError> {
    let path = path.as_ref();
    let html = render_report(records, generated_at)?;
    std::fs::write(path, html).map_err(|e| ReportError::io(path, e))
}
