//! Forecast inputs and the metrics derived from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single hourly forecast sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourSample {
    pub hour: i64,
    pub temperature: i32,
    pub condition: String,
}

/// One forecast day. Only days carrying a full 24 samples are rated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub hours: Vec<HourSample>,
}

/// Raw forecast for a city as handed over by the weather source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityForecast {
    pub city_name: String,
    pub days: Vec<ForecastDay>,
}

/// Daytime-window weather for a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWeather {
    pub average_temp: i32,
    pub no_precipitation: u32,
}

/// Per-day metrics, serialized as `{date, weather: {average_temp, no_precipitation}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMetrics {
    pub date: NaiveDate,
    pub weather: DayWeather,
}

impl DayMetrics {
    pub fn average_temperature(&self) -> i32 {
        self.weather.average_temp
    }

    pub fn precipitation_free_hours(&self) -> u32 {
        self.weather.no_precipitation
    }
}

/// City-level metrics produced by the compute stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityMetrics {
    pub city_name: String,
    pub days: Vec<DayMetrics>,
    pub average_temperature: i32,
    pub total_precipitation_free_hours: u32,
    pub rating: i64,
}

/// Every city that made it through the compute stage, in receipt order.
pub type RankedDataset = Vec<CityMetrics>;
