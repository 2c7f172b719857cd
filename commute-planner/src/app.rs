//! Command implementations.
//!
//! `analyze` runs the full pipeline (addresses in, CSV/HTML/PDF out);
//! `visualize` rebuilds the HTML and PDF from a saved result CSV.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::batch::{BatchOptions, BatchRunner};
use crate::cache::{CacheConfig, CachedMapsClient};
use crate::config::{API_KEY_VAR, AppConfig, ConfigError};
use crate::domain::CommuteDirection;
use crate::input::{InputError, read_addresses};
use crate::maps::{GoogleMapsClient, MapsConfig, MapsError, MockMapsClient};
use crate::planner::{CommuteError, MapsProvider};
use crate::report::{
    PdfExporter, ReportError, ResultRecord, read_csv, records_from_outcomes, write_csv,
    write_html,
};

/// Error from a command.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("maps client: {0}")]
    Maps(#[from] MapsError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Commute(#[from] CommuteError),
}

/// Options for `analyze`.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub report: PathBuf,
    pub directions: Vec<CommuteDirection>,
    pub discover_stations: bool,
    pub search_radius_m: u32,
    pub max_concurrent_rows: usize,
    /// Serve API responses from this fixture instead of Google.
    pub mock_data: Option<PathBuf>,
    /// PDF converter; `None` skips the PDF.
    pub pdf: Option<PdfExporter>,
}

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub evaluated: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub csv: Option<PathBuf>,
    pub html: PathBuf,
    pub pdf: Option<PathBuf>,
}

/// Run the full analysis.
///
/// `now` fixes the travel date (the next weekday after it).
pub async fn run_analyze(
    options: &AnalyzeOptions,
    config: &AppConfig,
    now: DateTime<Utc>,
) -> Result<RunSummary, AppError> {
    if let Some(fixture) = &options.mock_data {
        info!(fixture = %fixture.display(), "using mock maps data");
        let provider = MockMapsClient::from_file(fixture)?;
        return analyze_with(&provider, options, config, now).await;
    }

    let api_key = config
        .api_key
        .clone()
        .ok_or(ConfigError::Missing(API_KEY_VAR))?;
    let client = GoogleMapsClient::new(
        MapsConfig::new(api_key)
            .with_base_url(&config.base_url)
            .with_allowed_lines(config.allowed_lines.clone()),
    )?;
    let provider = CachedMapsClient::new(client, &CacheConfig::default());

    analyze_with(&provider, options, config, now).await
}

/// Run the analysis against any provider.
pub async fn analyze_with<P: MapsProvider>(
    provider: &P,
    options: &AnalyzeOptions,
    config: &AppConfig,
    now: DateTime<Utc>,
) -> Result<RunSummary, AppError> {
    let rows = read_addresses(&options.input)?;
    let travel_date = config.travel_date(now);

    let mut batch = BatchOptions::new(travel_date)
        .with_directions(options.directions.clone())
        .with_max_concurrent_rows(options.max_concurrent_rows);
    if options.discover_stations {
        batch = batch.with_discovery(options.search_radius_m);
    }

    info!(
        input = %options.input.display(),
        rows = rows.len(),
        %travel_date,
        destination = %config.commute.destination,
        "analysing commutes"
    );

    let runner = BatchRunner::new(provider, &config.commute, batch)?;
    let outcomes = runner.run(&rows).await;

    let records = records_from_outcomes(
        &outcomes,
        &config.commute.destination,
        config.commute.timezone,
    );
    write_csv(&options.output, &records)?;
    info!(path = %options.output.display(), records = records.len(), "result CSV written");

    let generated_at = now
        .with_timezone(&config.commute.timezone)
        .format("%Y-%m-%d %H:%M")
        .to_string();
    let (html, pdf) = write_reports(&records, &options.report, generated_at, options.pdf.as_ref()).await?;

    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    Ok(RunSummary {
        evaluated: outcomes.len(),
        succeeded,
        failed: outcomes.len() - succeeded,
        csv: Some(options.output.clone()),
        html,
        pdf,
    })
}

/// Rebuild the HTML (and PDF) report from a result CSV.
pub async fn run_visualize(
    input: &Path,
    output: &Path,
    pdf: Option<&PdfExporter>,
    generated_at: impl Into<String>,
) -> Result<RunSummary, AppError> {
    let records = read_csv(input)?;
    info!(input = %input.display(), records = records.len(), "loaded results");

    let (html, pdf) = write_reports(&records, output, generated_at.into(), pdf).await?;

    let succeeded = records.iter().filter(|r| r.is_ok()).count();
    Ok(RunSummary {
        evaluated: records.len(),
        succeeded,
        failed: records.len() - succeeded,
        csv: None,
        html,
        pdf,
    })
}

/// Write the HTML report, then try the PDF.
///
/// A PDF failure is only a warning; the HTML report stands on its own.
async fn write_reports(
    records: &[ResultRecord],
    html: &Path,
    generated_at: String,
    pdf: Option<&PdfExporter>,
) -> Result<(PathBuf, Option<PathBuf>), ReportError> {
    write_html(html, records, generated_at)?;
    info!(path = %html.display(), "HTML report written");

    let Some(exporter) = pdf else {
        return Ok((html.to_path_buf(), None));
    };

    let pdf_path = PdfExporter::pdf_path_for(html);
    match exporter.export(html, &pdf_path).await {
        Ok(()) => {
            info!(path = %pdf_path.display(), "PDF report written");
            Ok((html.to_path_buf(), Some(pdf_path)))
        }
        Err(e) => {
            warn!("PDF export failed, HTML report still available at {}: {e}", html.display());
            Ok((html.to_path_buf(), None))
        }
    }
}
