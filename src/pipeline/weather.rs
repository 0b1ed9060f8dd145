// src/pipeline/weather.rs

//! Weather pipeline entry point.
//!
//! Fetch → extract → assemble → fallback, strictly in sequence. One call
//! produces one snapshot; the only state kept between calls lives in the
//! snapshot store.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Config, Snapshot};
use crate::pipeline::{Resilience, SnapshotAssembler};
use crate::storage::{LocalStorage, SnapshotStore};
use crate::utils::http::{HttpFetcher, PageSource};

/// Sequences the fetcher, extractors and snapshot store.
pub struct WeatherPipeline {
    source: Box<dyn PageSource>,
    assembler: SnapshotAssembler,
    resilience: Resilience,
}

impl WeatherPipeline {
    pub fn new(
        source: Box<dyn PageSource>,
        assembler: SnapshotAssembler,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            source,
            assembler,
            resilience: Resilience::new(store),
        }
    }

    /// Build the production pipeline: HTTP fetcher and local file store.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = HttpFetcher::from_config(config)?;
        let assembler = SnapshotAssembler::new(&config.markup)?;
        let store = LocalStorage::new(&config.cache.path);
        Ok(Self::new(Box::new(source), assembler, Arc::new(store)))
    }

    /// Run the pipeline once. Always returns a well-formed snapshot.
    pub async fn get_weather(&self) -> Snapshot {
        let fetched = self.source.fetch().await;
        let state = self.assembler.classify(fetched);
        log::debug!("Fetch state: {}", state.label());
        self.resilience.resolve(state).await
    }
}

/// Convenience wrapper: build from config and run once.
pub async fn get_weather(config: &Config) -> Result<Snapshot> {
    let pipeline = WeatherPipeline::from_config(config)?;
    Ok(pipeline.get_weather().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::error::AppError;
    use crate::models::MarkupConfig;
    use crate::utils::retry::RetryPolicy;

    const GOOD_PAGE: &str = r#"
<span id="ContentPlaceHolder1_spanPronosticoGeneralTexto">
  <p class="PronosticoGeneralTitulo">Pronóstico para Hoy</p>
  <p class="PronosticoGeneralDetalle">Mínima de 12°C.<br/>Máxima de 27°C.<br/>Viento leve.</p>
</span>
<script>var vEstaciones = [[20,"La Punta",-33.18,-66.31,new Date(1700000000000),24.5,null]];</script>
"#;

    const BLANK_PAGE: &str = "<html><body></body></html>";

    /// Serves a fixed page.
    struct StaticSource(&'static str);

    #[async_trait]
    impl PageSource for StaticSource {
        async fn fetch(&self) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    /// Always refuses the connection, through a real retry policy.
    struct DownSource {
        calls: AtomicU32,
        retry: RetryPolicy,
    }

    impl DownSource {
        fn new(attempts: u32) -> Self {
            Self {
                calls: AtomicU32::new(0),
                retry: RetryPolicy::new(attempts, Duration::ZERO),
            }
        }
    }

    #[async_trait]
    impl PageSource for DownSource {
        async fn fetch(&self) -> Result<String> {
            self.retry
                .run("down", || async {
                    self.calls.fetch_add(1, Ordering::SeqCst);
                    Err(AppError::Io(std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "connection refused",
                    )))
                })
                .await
        }
    }

    fn pipeline(source: Box<dyn PageSource>, store: &Arc<LocalStorage>) -> WeatherPipeline {
        let assembler = SnapshotAssembler::new(&MarkupConfig::default()).unwrap();
        let store: Arc<dyn SnapshotStore> = store.clone();
        WeatherPipeline::new(source, assembler, store)
    }

    fn store(tmp: &TempDir) -> Arc<LocalStorage> {
        Arc::new(LocalStorage::new(tmp.path().join("ultimo_clima.json")))
    }

    #[tokio::test]
    async fn test_fresh_ok_is_returned_and_persisted() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);

        let snapshot = pipeline(Box::new(StaticSource(GOOD_PAGE)), &store)
            .get_weather()
            .await;

        assert!(snapshot.success);
        assert!(!snapshot.using_cache);
        assert!(snapshot.saved_at.is_none());
        let today = snapshot.forecast.as_ref().unwrap().today.as_ref().unwrap();
        assert_eq!((today.temp_min, today.temp_max), (Some(12), Some(27)));
        assert_eq!(snapshot.stations[0].precipitation, 0.0);

        let persisted = store.load().await.unwrap().unwrap();
        assert_eq!(Snapshot { saved_at: None, ..persisted }, snapshot);
    }

    #[tokio::test]
    async fn test_empty_page_without_cache() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);

        let snapshot = pipeline(Box::new(StaticSource(BLANK_PAGE)), &store)
            .get_weather()
            .await;

        assert!(snapshot.success);
        assert!(!snapshot.using_cache);
        assert!(snapshot.stations.is_empty());
        let forecast = snapshot.forecast.unwrap();
        assert!(forecast.current_state.is_none());
        assert!(forecast.today.is_none());
        // Empty results are never persisted.
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_page_with_cache_serves_previous() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);

        let fresh = pipeline(Box::new(StaticSource(GOOD_PAGE)), &store)
            .get_weather()
            .await;
        let snapshot = pipeline(Box::new(StaticSource(BLANK_PAGE)), &store)
            .get_weather()
            .await;

        assert!(snapshot.success);
        assert!(snapshot.using_cache);
        assert!(snapshot.saved_at.is_some());
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.stations, fresh.stations);
        assert_eq!(snapshot.forecast, fresh.forecast);
    }

    #[tokio::test]
    async fn test_exhausted_retries_without_cache_fail() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let source = Arc::new(DownSource::new(3));

        struct Shared(Arc<DownSource>);
        #[async_trait]
        impl PageSource for Shared {
            async fn fetch(&self) -> Result<String> {
                self.0.fetch().await
            }
        }

        let snapshot = pipeline(Box::new(Shared(Arc::clone(&source))), &store)
            .get_weather()
            .await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert!(!snapshot.success);
        assert!(!snapshot.using_cache);
        assert!(snapshot.forecast.is_none());
        assert!(snapshot.stations.is_empty());
        let error = snapshot.error.unwrap();
        assert!(error.contains("3 attempt(s)"));
        assert!(error.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_fetch_failure_with_cache_serves_previous() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);

        pipeline(Box::new(StaticSource(GOOD_PAGE)), &store)
            .get_weather()
            .await;
        let snapshot = pipeline(Box::new(DownSource::new(2)), &store)
            .get_weather()
            .await;

        assert!(snapshot.success);
        assert!(snapshot.using_cache);
        assert_eq!(snapshot.stations.len(), 1);
        assert!(snapshot.error.as_deref().unwrap().contains("connection refused"));
        assert_eq!(snapshot.error, snapshot.original_error);

        let value = serde_json::to_value(&snapshot).unwrap();
        assert!(value["error_original"].is_string());
        assert!(value["timestamp_guardado"].is_string());
        assert_eq!(value["usando_cache"], true);
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        std::fs::write(store.path(), b"garbage").unwrap();

        let snapshot = pipeline(Box::new(DownSource::new(1)), &store)
            .get_weather()
            .await;

        assert!(!snapshot.success);
        assert!(!snapshot.using_cache);
    }
}
