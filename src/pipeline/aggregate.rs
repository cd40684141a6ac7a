//! Collects computed city records and persists them as one dataset.

use tokio::sync::mpsc;
use tracing::{Instrument, Span, debug, info, info_span};

use crate::error::PipelineError;
use crate::model::{CityMetrics, RankedDataset};
use crate::output::write_dataset;

pub struct AggregationStage {
    output_path: String,
    span: Span,
}

impl AggregationStage {
    pub fn new(output_path: impl Into<String>, span: Span) -> Self {
        Self {
            output_path: output_path.into(),
            span,
        }
    }

    /// Drains `rx` until every sender is gone, then writes the buffered
    /// records to the output file in a single pass.
    ///
    /// Termination relies on channel closure, so this must only be handed a
    /// receiver whose senders are all owned by the compute stage.
    pub async fn run(&self, mut rx: mpsc::UnboundedReceiver<CityMetrics>) -> Result<RankedDataset, PipelineError> {
        let span = info_span!(parent: &self.span, "aggregate", output = %self.output_path);

        async move {
            let mut dataset = Vec::new();
            while let Some(metrics) = rx.recv().await {
                debug!(city = %metrics.city_name, rating = metrics.rating, "Record received");
                dataset.push(metrics);
            }

            write_dataset(&self.output_path, &dataset)?;
            info!(rows = dataset.len(), "Dataset written");
            Ok::<_, PipelineError>(dataset)
        }
        .instrument(span)
        .await
    }
}
