//! Reduction of a raw city forecast into rated metrics.

use crate::error::CityError;
use crate::model::{CityForecast, CityMetrics, DayMetrics, DayWeather, ForecastDay};

/// Number of hourly samples a day must carry to be rated.
pub const FULL_DAY_HOURS: usize = 24;

/// First hour of the daytime window.
pub const DAYTIME_START: usize = 9;
/// Last hour of the daytime window, inclusive.
pub const DAYTIME_END: usize = 19;

/// Conditions that count as a precipitation-free hour.
pub const NO_PRECIPITATION: &[&str] = &["clear", "partly-cloud", "cloudy", "overcast"];

pub fn is_precipitation_free(condition: &str) -> bool {
    NO_PRECIPITATION.contains(&condition)
}

/// Integer mean rounded toward negative infinity.
fn floor_mean(sum: i64, count: usize) -> i64 {
    sum.div_euclid(count as i64)
}

impl DayMetrics {
    /// Computes daytime metrics for `day`, or `None` if the day is incomplete.
    pub fn from_day(day: &ForecastDay) -> Option<Self> {
        if day.hours.len() != FULL_DAY_HOURS {
            return None;
        }

        let window = &day.hours[DAYTIME_START..=DAYTIME_END];
        let temp_sum: i64 = window.iter().map(|h| i64::from(h.temperature)).sum();
        let no_precipitation = window
            .iter()
            .filter(|h| is_precipitation_free(&h.condition))
            .count() as u32;

        Some(DayMetrics {
            date: day.date,
            weather: DayWeather {
                average_temp: floor_mean(temp_sum, window.len()) as i32,
                no_precipitation,
            },
        })
    }
}

/// Reduces a city forecast into [`CityMetrics`].
///
/// Days without exactly [`FULL_DAY_HOURS`] samples are skipped entirely.
///
/// # Errors
///
/// Returns [`CityError::InsufficientData`] if no day qualifies.
pub fn reduce(forecast: &CityForecast) -> Result<CityMetrics, CityError> {
    let days: Vec<DayMetrics> = forecast.days.iter().filter_map(DayMetrics::from_day).collect();

    if days.is_empty() {
        return Err(CityError::InsufficientData {
            city: forecast.city_name.clone(),
        });
    }

    let temp_sum: i64 = days.iter().map(|d| i64::from(d.average_temperature())).sum();
    let total_precipitation_free_hours: u32 = days.iter().map(|d| d.precipitation_free_hours()).sum();

    Ok(CityMetrics {
        city_name: forecast.city_name.clone(),
        average_temperature: floor_mean(temp_sum, days.len()) as i32,
        total_precipitation_free_hours,
        rating: temp_sum + i64::from(total_precipitation_free_hours),
        days,
    })
}
