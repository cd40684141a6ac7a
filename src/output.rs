//! Persistence of the ranked dataset.
//!
//! The dataset is a CSV with one row per city:
//! `city,all_weather,av_temp,no_precipitation,rating`, where `all_weather`
//! holds the per-day metrics as a JSON array.

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::File;
use tracing::debug;

use crate::error::PipelineError;
use crate::model::{CityMetrics, DayMetrics, RankedDataset};

#[derive(Debug, Serialize, Deserialize)]
struct DatasetRow {
    city: String,
    all_weather: String,
    av_temp: i32,
    no_precipitation: u32,
    rating: i64,
}

impl DatasetRow {
    fn from_metrics(m: &CityMetrics) -> serde_json::Result<Self> {
        Ok(Self {
            city: m.city_name.clone(),
            all_weather: serde_json::to_string(&m.days)?,
            av_temp: m.average_temperature,
            no_precipitation: m.total_precipitation_free_hours,
            rating: m.rating,
        })
    }

    fn into_metrics(self) -> serde_json::Result<CityMetrics> {
        let days: Vec<DayMetrics> = serde_json::from_str(&self.all_weather)?;
        Ok(CityMetrics {
            city_name: self.city,
            days,
            average_temperature: self.av_temp,
            total_precipitation_free_hours: self.no_precipitation,
            rating: self.rating,
        })
    }
}

fn persistence_error(path: &str, reason: impl ToString) -> PipelineError {
    PipelineError::Persistence {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

/// Writes the whole dataset to `path`, replacing any previous contents.
pub fn write_dataset(path: &str, dataset: &[CityMetrics]) -> Result<(), PipelineError> {
    debug!(path, rows = dataset.len(), "Writing dataset");

    let file = File::create(path).map_err(|e| persistence_error(path, e))?;
    // An empty dataset still gets a header row.
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    writer
        .write_record(["city", "all_weather", "av_temp", "no_precipitation", "rating"])
        .map_err(|e| persistence_error(path, e))?;

    for metrics in dataset {
        let row = DatasetRow::from_metrics(metrics).map_err(|e| persistence_error(path, e))?;
        writer.serialize(row).map_err(|e| persistence_error(path, e))?;
    }
    writer.flush().map_err(|e| persistence_error(path, e))?;

    Ok(())
}

/// Reads a dataset previously written by [`write_dataset`].
pub fn read_dataset(path: &str) -> Result<RankedDataset, PipelineError> {
    let file = File::open(path).map_err(|e| persistence_error(path, e))?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let mut dataset = Vec::new();
    for result in reader.deserialize() {
        let row: DatasetRow = result.map_err(|e| persistence_error(path, e))?;
        dataset.push(row.into_metrics().map_err(|e| persistence_error(path, e))?);
    }

    debug!(path, rows = dataset.len(), "Dataset loaded");
    Ok(dataset)
}
