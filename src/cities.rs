//! Static city configuration.
//!
//! Maps each city to the source its forecast is loaded from. Stored on disk
//! as a plain JSON object:
//! ```json
//! {
//!   "MOSCOW": "https://code.s3.yandex.net/async-module/moscow-response.json",
//!   "LOCAL": "fixtures/local-response.json"
//! }
//! ```
//! Sources that do not start with `http` are read from the filesystem.

use anyhow::{Context, Result};
use std::collections::BTreeMap;

const BUILTIN_BASE_URL: &str = "https://code.s3.yandex.net/async-module";

const BUILTIN_CITIES: &[(&str, &str)] = &[
    ("MOSCOW", "moscow"),
    ("PARIS", "paris"),
    ("LONDON", "london"),
    ("BERLIN", "berlin"),
    ("BEIJING", "beijing"),
    ("KAZAN", "kazan"),
    ("SPETERSBURG", "spetersburg"),
    ("VOLGOGRAD", "volgograd"),
    ("NOVOSIBIRSK", "novosibirsk"),
    ("KALININGRAD", "kaliningrad"),
    ("ABUDHABI", "abudhabi"),
    ("WARSZAWA", "warszawa"),
    ("BUCHAREST", "bucharest"),
    ("ROMA", "roma"),
    ("CAIRO", "cairo"),
];

#[derive(Debug, Clone, Default)]
pub struct CityConfig {
    entries: BTreeMap<String, String>,
}

impl CityConfig {
    /// The fixed city set shipped with the tool.
    pub fn builtin() -> Self {
        let entries = BUILTIN_CITIES
            .iter()
            .map(|(name, slug)| {
                (
                    name.to_string(),
                    format!("{BUILTIN_BASE_URL}/{slug}-response.json"),
                )
            })
            .collect();
        Self { entries }
    }

    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read city config '{path}'"))?;
        let entries: BTreeMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("invalid city config '{path}'"))?;
        Ok(Self { entries })
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the forecast source for `city`, if one is configured.
    pub fn source(&self, city: &str) -> Option<&str> {
        self.entries.get(city).map(String::as_str)
    }

    /// City names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Iterates over all `(city, source)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
