//! CLI entry point for the city weather rater.
//!
//! Running without a subcommand fetches the forecast of every configured
//! city, writes the rated dataset, and prints the most favourable city.

use anyhow::Result;
use city_weather_rater::cities::CityConfig;
use city_weather_rater::fetch::{BasicClient, WeatherApiClient};
use city_weather_rater::pipeline::{
    DEFAULT_CONCURRENCY, DEFAULT_OUTPUT_PATH, PipelineConfig, RankingAnalyzer, forecast_weather,
};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Span, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Parser)]
#[command(name = "city_weather_rater")]
#[command(about = "Ranks cities by daytime weather favourability", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all forecasts, write the dataset and report the best city
    Run {
        /// CSV file the dataset is written to (overwritten each run)
        #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
        output: String,

        /// Optional JSON file mapping city names to forecast sources
        #[arg(short, long)]
        cities: Option<String>,

        /// Maximum number of cities fetched concurrently
        #[arg(short = 'j', long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        /// HTTP request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,
    },
    /// Report the best city from an existing dataset
    Analyze {
        /// CSV file produced by a previous run
        #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
        input: String,
    },
    /// List the configured cities and their forecast sources
    ListCities {
        /// Optional JSON file mapping city names to forecast sources
        #[arg(short, long)]
        cities: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/city_weather_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("city_weather_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let command = cli.command.unwrap_or_else(|| {
        let defaults = PipelineConfig::default();
        Commands::Run {
            output: defaults.output_path,
            cities: None,
            concurrency: defaults.concurrency,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    });

    match command {
        Commands::Run {
            output,
            cities,
            concurrency,
            timeout,
        } => {
            let city_config = load_cities(cities.as_deref())?;
            let names = city_config.names();
            info!(cities = names.len(), output = %output, "Rating cities");

            let http = BasicClient::new(Duration::from_secs(timeout))?;
            let source = Arc::new(WeatherApiClient::new(http, city_config));
            let config = PipelineConfig {
                output_path: output,
                concurrency,
            };

            let best = forecast_weather(source, &names, &config).await?;
            println!("Most favourable city for travel: {best}");
        }
        Commands::Analyze { input } => {
            let best = RankingAnalyzer::new(Span::current()).analyze(&input)?;
            println!("Most favourable city for travel: {best}");
        }
        Commands::ListCities { cities } => {
            let city_config = load_cities(cities.as_deref())?;
            for (name, source) in city_config.iter() {
                println!("{name}\t{source}");
            }
        }
    }

    Ok(())
}

fn load_cities(path: Option<&str>) -> Result<CityConfig> {
    match path {
        Some(path) => CityConfig::load(path),
        None => Ok(CityConfig::builtin()),
    }
}
