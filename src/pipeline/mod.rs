//! Staged rating pipeline.
//!
//! Cities are fetched and reduced concurrently by [`ComputeStage`], which
//! pushes each record onto a hand-off channel. Once every worker has
//! finished, [`AggregationStage`] drains the closed channel and writes the
//! dataset, and [`RankingAnalyzer`] reads it back to pick the best city.

pub mod aggregate;
pub mod compute;
pub mod rank;

pub use aggregate::AggregationStage;
pub use compute::{ComputeReport, ComputeStage};
pub use rank::{RankingAnalyzer, best_city};

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{info, info_span, warn};

use crate::error::PipelineError;
use crate::fetch::WeatherSource;
use crate::model::CityMetrics;

/// Default number of cities fetched at once.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default location of the persisted dataset.
pub const DEFAULT_OUTPUT_PATH: &str = "output.csv";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub output_path: String,
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Channel carrying finished records from compute to aggregation.
///
/// Aggregation only starts after compute completes, so the channel is
/// unbounded and producers never wait on the consumer. It holds at most one
/// record per city.
pub fn hand_off_channel() -> (
    mpsc::UnboundedSender<CityMetrics>,
    mpsc::UnboundedReceiver<CityMetrics>,
) {
    mpsc::unbounded_channel()
}

/// Runs compute, aggregation and ranking in order and returns the best city.
pub async fn forecast_weather(
    source: Arc<dyn WeatherSource>,
    cities: &[String],
    config: &PipelineConfig,
) -> Result<String, PipelineError> {
    let run_span = info_span!(
        "forecast_weather",
        run_id = %Utc::now().format("%Y%m%dT%H%M%S%.3fZ"),
    );

    let (tx, rx) = hand_off_channel();

    let report = ComputeStage::new(source, config.concurrency, run_span.clone())
        .run(cities, tx)
        .await;
    for (city, reason) in &report.failed {
        warn!(parent: &run_span, city = %city, reason = %reason, "City excluded from ranking");
    }

    let dataset = AggregationStage::new(&config.output_path, run_span.clone())
        .run(rx)
        .await?;
    info!(parent: &run_span, rows = dataset.len(), "Aggregation complete");

    RankingAnalyzer::new(run_span).analyze(&config.output_path)
}
