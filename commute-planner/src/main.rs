use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use chrono::{Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::error;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use commute_planner::app::{AnalyzeOptions, RunSummary, run_analyze, run_visualize};
use commute_planner::config::{AppConfig, LoadOptions};
use commute_planner::domain::CommuteDirection;
use commute_planner::report::{DEFAULT_PDF_PROGRAM, PdfExporter};

/// Drive-to-station plus transit commute estimator
#[derive(Parser)]
#[command(name = "commute-planner")]
#[command(version, about = "Find the fastest drive + rail commute for a list of addresses", long_about = None)]
struct Cli {
    /// Verbosity level (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Detailed DEBUG log file
    #[arg(long, global = true, default_value = "route_details.log")]
    log_file: PathBuf,

    /// Do not write the log file
    #[arg(long, global = true)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every address and write CSV, HTML and PDF outputs
    Analyze {
        /// Input CSV with an `address` column
        #[arg(short, long, default_value = "addresses.csv")]
        input: PathBuf,

        /// Result CSV
        #[arg(short, long, default_value = "transit_analysis.csv")]
        output: PathBuf,

        /// HTML report (the PDF is written next to it)
        #[arg(long, default_value = "commute_analysis.html")]
        report: PathBuf,

        /// Which commutes to evaluate
        #[arg(long, value_enum, default_value_t = DirectionArg::Both)]
        direction: DirectionArg,

        /// Also consider train stations near each address
        #[arg(long)]
        discover_stations: bool,

        /// Station discovery radius in metres
        #[arg(long, default_value_t = 3000)]
        search_radius: u32,

        /// Addresses evaluated concurrently
        #[arg(long, default_value_t = 4)]
        concurrency: usize,

        /// Serve API responses from a JSON fixture instead of Google
        #[arg(long)]
        mock_data: Option<PathBuf>,

        /// Skip the PDF report
        #[arg(long)]
        no_pdf: bool,

        /// HTML to PDF converter
        #[arg(long, env = "WKHTMLTOPDF", default_value = DEFAULT_PDF_PROGRAM)]
        pdf_program: PathBuf,
    },

    /// Rebuild the HTML and PDF report from a result CSV
    Visualize {
        /// Result CSV written by `analyze`
        #[arg(short, long, default_value = "transit_analysis.csv")]
        input: PathBuf,

        /// HTML report
        #[arg(short, long, default_value = "commute_analysis.html")]
        output: PathBuf,

        /// Skip the PDF report
        #[arg(long)]
        no_pdf: bool,

        /// HTML to PDF converter
        #[arg(long, env = "WKHTMLTOPDF", default_value = DEFAULT_PDF_PROGRAM)]
        pdf_program: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DirectionArg {
    Morning,
    Evening,
    Both,
}

impl DirectionArg {
    fn directions(self) -> Vec<CommuteDirection> {
        match self {
            DirectionArg::Morning => vec![CommuteDirection::Morning],
            DirectionArg::Evening => vec![CommuteDirection::Evening],
            DirectionArg::Both => vec![CommuteDirection::Morning, CommuteDirection::Evening],
        }
    }
}

/// Console logging on stderr filtered by `RUST_LOG` or `-v`, plus a DEBUG
/// log file for route details.
fn init_logging(verbose: u8, log_file: Option<&PathBuf>) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let file_layer = log_file.and_then(|path| match File::create(path) {
        Ok(file) => Some(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(EnvFilter::new("commute_planner=debug")),
        ),
        Err(e) => {
            eprintln!("Warning: cannot write log file {}: {e}", path.display());
            None
        }
    });

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!(
        "Evaluated {} commutes: {} succeeded, {} failed",
        summary.evaluated, summary.succeeded, summary.failed
    );
    if let Some(csv) = &summary.csv {
        println!("Results saved to {}", csv.display());
    }
    println!("HTML report saved to {}", summary.html.display());
    if let Some(pdf) = &summary.pdf {
        println!("PDF report saved to {}", pdf.display());
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, (!cli.no_log_file).then_some(&cli.log_file));

    let result = match cli.command {
        Commands::Analyze {
            input,
            output,
            report,
            direction,
            discover_stations,
            search_radius,
            concurrency,
            mock_data,
            no_pdf,
            pdf_program,
        } => {
            let load = LoadOptions {
                require_api_key: mock_data.is_none(),
                allow_no_stations: discover_stations,
            };
            match AppConfig::from_env(load) {
                Ok(config) => {
                    let options = AnalyzeOptions {
                        input,
                        output,
                        report,
                        directions: direction.directions(),
                        discover_stations,
                        search_radius_m: search_radius,
                        max_concurrent_rows: concurrency,
                        mock_data,
                        pdf: (!no_pdf).then(|| PdfExporter::new(pdf_program)),
                    };
                    run_analyze(&options, &config, Utc::now()).await
                }
                Err(e) => Err(e.into()),
            }
        }
        Commands::Visualize {
            input,
            output,
            no_pdf,
            pdf_program,
        } => {
            let pdf = (!no_pdf).then(|| PdfExporter::new(pdf_program));
            let generated_at = Local::now().format("%Y-%m-%d %H:%M").to_string();
            run_visualize(&input, &output, pdf.as_ref(), generated_at).await
        }
    };

    match result {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
