//! Concurrent per-city fetch and reduction.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tracing::{Instrument, Span, debug, error, info, info_span};

use crate::error::CityError;
use crate::fetch::WeatherSource;
use crate::metrics::reduce;
use crate::model::CityMetrics;

#[derive(Debug, Error)]
enum WorkerError {
    #[error(transparent)]
    City(#[from] CityError),

    #[error("hand-off channel closed before the record was delivered")]
    ChannelClosed,

    #[error("worker pool shut down")]
    PoolClosed,
}

/// Outcome of a compute run, available once every worker has terminated.
#[derive(Debug, Default)]
pub struct ComputeReport {
    /// Cities whose record was pushed onto the hand-off channel.
    pub succeeded: Vec<String>,
    /// Cities that were dropped, with the reason.
    pub failed: Vec<(String, String)>,
}

/// Fetches and reduces every configured city on a bounded pool of tasks,
/// pushing each finished [`CityMetrics`] onto the hand-off channel.
pub struct ComputeStage {
    source: Arc<dyn WeatherSource>,
    concurrency: usize,
    span: Span,
}

impl ComputeStage {
    pub fn new(source: Arc<dyn WeatherSource>, concurrency: usize, span: Span) -> Self {
        Self {
            source,
            concurrency,
            span,
        }
    }

    /// Runs all cities and waits for every worker to finish.
    ///
    /// `tx` is consumed: once this returns, every sender has been dropped and
    /// the receiving side observes the channel as closed. The channel is
    /// unbounded so workers never wait on a consumer that has not started.
    /// A failing city is logged and skipped; it never affects its siblings.
    pub async fn run(&self, cities: &[String], tx: mpsc::UnboundedSender<CityMetrics>) -> ComputeReport {
        let permits = self.concurrency.clamp(1, cities.len().max(1));
        let semaphore = Arc::new(Semaphore::new(permits));

        info!(parent: &self.span, cities = cities.len(), permits, "Starting compute stage");

        let mut tasks = Vec::with_capacity(cities.len());

        for city in cities {
            let sem = semaphore.clone();
            let source = self.source.clone();
            let tx = tx.clone();
            let worker_city = city.clone();

            let city_span = info_span!(parent: &self.span, "compute_city", city = %city);

            let task = tokio::spawn(
                async move {
                    let _permit = sem.acquire().await.map_err(|_| WorkerError::PoolClosed)?;

                    let forecast = source.fetch(&worker_city).await?;
                    debug!(days = forecast.days.len(), "Forecast fetched");

                    let metrics = reduce(&forecast)?;
                    info!(
                        name = %metrics.city_name,
                        av_temp = metrics.average_temperature,
                        no_precipitation = metrics.total_precipitation_free_hours,
                        rating = metrics.rating,
                        "City metrics computed"
                    );

                    tx.send(metrics).map_err(|_| WorkerError::ChannelClosed)?;
                    Ok::<(), WorkerError>(())
                }
                .instrument(city_span),
            );

            tasks.push((city.clone(), task));
        }

        // Workers hold the only remaining senders.
        drop(tx);

        let mut report = ComputeReport::default();
        for (city, task) in tasks {
            match task.await {
                Ok(Ok(())) => report.succeeded.push(city),
                Ok(Err(e)) => {
                    error!(parent: &self.span, city = %city, error = %e, "City dropped");
                    report.failed.push((city, e.to_string()));
                }
                Err(e) => {
                    error!(parent: &self.span, city = %city, error = %e, "City worker aborted");
                    report.failed.push((city, e.to_string()));
                }
            }
        }

        info!(
            parent: &self.span,
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Compute stage finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::model::{CityForecast, ForecastDay, HourSample};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn forecast(name: &str, temp: i32) -> CityForecast {
        CityForecast {
            city_name: name.to_string(),
            days: vec![ForecastDay {
                date: NaiveDate::from_ymd_opt(2022, 5, 26).unwrap(),
                hours: (0..24)
                    .map(|h| HourSample {
                        hour: h,
                        temperature: temp,
                        condition: "clear".to_string(),
                    })
                    .collect(),
            }],
        }
    }

    /// Serves canned forecasts; cities not in the map fail to fetch.
    struct StubSource {
        forecasts: HashMap<String, CityForecast>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl StubSource {
        fn new(forecasts: Vec<(&str, CityForecast)>) -> Self {
            Self {
                forecasts: forecasts
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WeatherSource for StubSource {
        async fn fetch(&self, city: &str) -> Result<CityForecast, CityError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.forecasts
                .get(city)
                .cloned()
                .ok_or_else(|| FetchError::UnknownCity(city.to_string()).into())
        }
    }

    fn names(cities: &[&str]) -> Vec<String> {
        cities.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_failed_cities_are_skipped() {
        let mut incomplete = forecast("Short", 5);
        incomplete.days[0].hours.truncate(20);

        let source = Arc::new(StubSource::new(vec![
            ("A", forecast("Alpha", 10)),
            ("B", forecast("Beta", 20)),
            ("S", incomplete),
        ]));
        let stage = ComputeStage::new(source, 4, Span::none());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let report = stage.run(&names(&["A", "B", "S", "MISSING"]), tx).await;

        let mut received = Vec::new();
        while let Some(m) = rx.recv().await {
            received.push(m.city_name);
        }
        received.sort();

        assert_eq!(received, vec!["Alpha".to_string(), "Beta".to_string()]);
        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.failed.len(), 2);
        let failed: Vec<_> = report.failed.iter().map(|(c, _)| c.as_str()).collect();
        assert!(failed.contains(&"S"));
        assert!(failed.contains(&"MISSING"));
    }

    #[tokio::test]
    async fn test_channel_closed_after_run() {
        let source = Arc::new(StubSource::new(vec![("A", forecast("Alpha", 10))]));
        let stage = ComputeStage::new(source, 2, Span::none());
        let (tx, mut rx) = mpsc::unbounded_channel();

        stage.run(&names(&["A"]), tx).await;

        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let cities: Vec<(String, CityForecast)> = (0..6)
            .map(|i| (format!("C{i}"), forecast(&format!("City{i}"), i)))
            .collect();
        let source = Arc::new(StubSource::new(
            cities.iter().map(|(k, v)| (k.as_str(), v.clone())).collect(),
        ));
        let stage = ComputeStage::new(source.clone(), 2, Span::none());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let city_names: Vec<String> = cities.iter().map(|(k, _)| k.clone()).collect();
        let report = stage.run(&city_names, tx).await;

        let mut count = 0;
        while rx.recv().await.is_some() {
            count += 1;
        }
        assert_eq!(count, 6);
        assert_eq!(report.succeeded.len(), 6);
        assert!(source.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_run_completes_before_any_record_is_read() {
        let source = Arc::new(StubSource::new(vec![
            ("A", forecast("Alpha", 10)),
            ("B", forecast("Beta", 20)),
            ("C", forecast("Gamma", 30)),
        ]));
        let stage = ComputeStage::new(source, 3, Span::none());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let report = tokio::time::timeout(
            Duration::from_secs(2),
            stage.run(&names(&["A", "B", "C"]), tx),
        )
        .await
        .expect("compute stage blocked on an idle consumer");

        assert_eq!(report.succeeded.len(), 3);
        let mut count = 0;
        while rx.recv().await.is_some() {
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_empty_city_list() {
        let source = Arc::new(StubSource::new(vec![]));
        let stage = ComputeStage::new(source, 4, Span::none());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let report = stage.run(&[], tx).await;

        assert!(report.succeeded.is_empty());
        assert!(rx.recv().await.is_none());
    }
}
