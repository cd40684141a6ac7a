//! Selection of the most favourable city.

use tracing::{Span, info};

use crate::error::PipelineError;
use crate::model::CityMetrics;
use crate::output::read_dataset;

/// Returns the name of the city with the highest rating.
///
/// Cities are ordered by rating with a stable ascending sort and the last one
/// wins, so on a tie the city that appears later in the dataset is chosen.
pub fn best_city(dataset: &[CityMetrics]) -> Result<String, PipelineError> {
    let mut ranked: Vec<&CityMetrics> = dataset.iter().collect();
    ranked.sort_by_key(|m| m.rating);

    ranked
        .last()
        .map(|m| m.city_name.clone())
        .ok_or(PipelineError::EmptyDataset)
}

/// Reads a persisted dataset back and reports its best city.
pub struct RankingAnalyzer {
    span: Span,
}

impl RankingAnalyzer {
    pub fn new(span: Span) -> Self {
        Self { span }
    }

    pub fn analyze(&self, path: &str) -> Result<String, PipelineError> {
        let _enter = self.span.enter();

        let dataset = read_dataset(path)?;
        let city = best_city(&dataset)?;
        info!(city = %city, candidates = dataset.len(), "Most favourable city for travel");
        Ok(city)
    }
}
