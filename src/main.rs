use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod model;
mod provider;
mod service;

use app::{AppError, AppState};
use model::{Config, Taxonomy};
use provider::{CurrencyRateProvider, MarketDataProvider};
use service::convert::convert_csv_to_json;
use service::report::{default_report_filename, save_as_table};

#[derive(Debug, Parser)]
#[command(name = "geopolitical-risk-agent", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score every risk category and country and write the CSV report (default)
    Run {
        /// Report file; defaults to geopolitical_risk_report_<timestamp>.csv
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the report as JSON next to the CSV
        #[arg(long)]
        json: bool,
    },
    /// Convert a CSV file into a JSON array of row objects
    Convert {
        input: PathBuf,
        /// Defaults to the input path with a .json extension
        output: Option<PathBuf>,
    },
    /// Latest price, volatility and mean volume for a ticker
    Market {
        symbol: String,
        #[arg(long, default_value = "1mo")]
        period: String,
    },
    /// Spot exchange rate for a currency pair
    Fx {
        from: String,
        #[arg(long, default_value = "USD")]
        to: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command.unwrap_or(Command::Run {
        output: None,
        json: false,
    }) {
        Command::Run { output, json } => run(config, output, json).await,
        Command::Convert { input, output } => match convert_csv_to_json(&input, output.as_deref()) {
            Ok((path, _)) => {
                println!("Successfully converted {} to {}", input.display(), path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        },
        Command::Market { symbol, period } => {
            match app::market_data(&config).snapshot(&symbol, &period).await {
                Some(snapshot) => print_json(&snapshot),
                None => {
                    eprintln!("No market data for {symbol}");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Fx { from, to } => {
            let rate = app::currency_rates(&config).exchange_rate(&from, &to).await;
            if rate.is_empty() {
                eprintln!("No exchange rate for {from}/{to}");
                return ExitCode::FAILURE;
            }
            print_json(&rate)
        }
    }
}

async fn run(config: Config, output: Option<PathBuf>, json: bool) -> ExitCode {
    let state = match AppState::new(config, Taxonomy::default()) {
        Ok(state) => state,
        Err(AppError::MissingCredentials(missing)) => {
            eprintln!("Error: The following required environment variables are not set:");
            for key in missing {
                eprintln!("- {key}");
            }
            eprintln!("\nPlease create a .env file with these variables and try again.");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let report = state.assessment_service.generate_report().await;

    if report.is_empty() {
        println!("No data was generated. Please check your API keys and try again.");
        return ExitCode::SUCCESS;
    }

    let path = output.unwrap_or_else(|| PathBuf::from(default_report_filename(Local::now())));

    if let Err(e) = save_as_table(&report, &path) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let expected = state.assessment_service.taxonomy().expected_assessments();

    println!("\n=== Analysis Complete ===");
    println!(
        "Generated report with {} risk assessments ({} skipped)",
        report.len(),
        expected.saturating_sub(report.len())
    );
    println!("Report saved as: {}", path.display());

    if json {
        match convert_csv_to_json(&path, None) {
            Ok((json_path, _)) => println!("JSON saved as: {}", json_path.display()),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
