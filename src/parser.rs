//! JSON parser for forecast payloads.
//!
//! Only the fields the reducer needs are declared; everything else in the
//! provider response is skipped by serde.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::error::CityError;
use crate::model::{CityForecast, ForecastDay, HourSample};

#[derive(Deserialize)]
struct Payload {
    geo_object: GeoObject,
    forecasts: Vec<ForecastEntry>,
}

#[derive(Deserialize)]
struct GeoObject {
    locality: Locality,
}

#[derive(Deserialize)]
struct Locality {
    name: String,
}

#[derive(Deserialize)]
struct ForecastEntry {
    date: NaiveDate,
    hours: Vec<HourEntry>,
}

#[derive(Deserialize)]
struct HourEntry {
    #[serde(deserialize_with = "hour_from_int_or_str")]
    hour: i64,
    temp: i32,
    condition: String,
}

/// The provider sends `"hour": "13"`; plain integers are accepted too.
/// The value is not range-checked since the daytime window is positional.
fn hour_from_int_or_str<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }

    use serde::de::Error;

    match Raw::deserialize(deserializer)? {
        Raw::Int(h) => Ok(h),
        Raw::Str(s) => s.trim().parse::<i64>().map_err(D::Error::custom),
    }
}

/// Decodes a forecast payload into a [`CityForecast`].
///
/// # Errors
///
/// Returns [`CityError::MalformedPayload`] if a required field is missing or
/// has the wrong type.
pub fn parse_forecast(bytes: &[u8]) -> Result<CityForecast, CityError> {
    let payload: Payload = serde_json::from_slice(bytes)?;

    let days = payload
        .forecasts
        .into_iter()
        .map(|f| ForecastDay {
            date: f.date,
            hours: f
                .hours
                .into_iter()
                .map(|h| HourSample {
                    hour: h.hour,
                    temperature: h.temp,
                    condition: h.condition,
                })
                .collect(),
        })
        .collect();

    Ok(CityForecast {
        city_name: payload.geo_object.locality.name,
        days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_extra_fields() {
        let json = br#"{
            "now": 1653555600,
            "info": {"lat": 55.75, "lon": 37.62},
            "geo_object": {"locality": {"id": 213, "name": "Moscow"}, "country": {"name": "Russia"}},
            "forecasts": [
                {"date": "2022-05-26", "week": 21, "hours": [
                    {"hour": "0", "temp": 12, "feels_like": 10, "condition": "overcast"},
                    {"hour": 1, "temp": 11, "condition": "light-rain", "wind_speed": 2.1}
                ]}
            ]
        }"#;

        let forecast = parse_forecast(json).unwrap();

        assert_eq!(forecast.city_name, "Moscow");
        assert_eq!(forecast.days.len(), 1);
        assert_eq!(forecast.days[0].date, NaiveDate::from_ymd_opt(2022, 5, 26).unwrap());
        assert_eq!(forecast.days[0].hours.len(), 2);
        assert_eq!(forecast.days[0].hours[0].hour, 0);
        assert_eq!(forecast.days[0].hours[1].condition, "light-rain");
    }

    #[test]
    fn test_parse_missing_locality_is_malformed() {
        let json = br#"{"geo_object": {}, "forecasts": []}"#;
        let result = parse_forecast(json);
        assert!(matches!(result, Err(CityError::MalformedPayload(_))));
    }

    #[test]
    fn test_parse_mistyped_temperature_is_malformed() {
        let json = br#"{
            "geo_object": {"locality": {"name": "Paris"}},
            "forecasts": [{"date": "2022-05-26", "hours": [{"hour": 0, "temp": "warm", "condition": "clear"}]}]
        }"#;
        let result = parse_forecast(json);
        assert!(matches!(result, Err(CityError::MalformedPayload(_))));
    }

    #[test]
    fn test_parse_accepts_any_integer_hour() {
        let json = br#"{
            "geo_object": {"locality": {"name": "Paris"}},
            "forecasts": [{"date": "2022-05-26", "hours": [
                {"hour": "24", "temp": 3, "condition": "clear"},
                {"hour": -1, "temp": 4, "condition": "clear"}
            ]}]
        }"#;

        let forecast = parse_forecast(json).unwrap();

        assert_eq!(forecast.days[0].hours[0].hour, 24);
        assert_eq!(forecast.days[0].hours[1].hour, -1);
    }

    #[test]
    fn test_parse_non_numeric_hour_is_malformed() {
        let json = br#"{
            "geo_object": {"locality": {"name": "Paris"}},
            "forecasts": [{"date": "2022-05-26", "hours": [{"hour": "noon", "temp": 3, "condition": "clear"}]}]
        }"#;
        let result = parse_forecast(json);
        assert!(matches!(result, Err(CityError::MalformedPayload(_))));
    }

    #[test]
    fn test_parse_invalid_bytes() {
        assert!(parse_forecast(&[0xFF, 0xFE, 0x00]).is_err());
    }
}
