// src/pipeline/assemble.rs

//! Snapshot assembly.
//!
//! Runs both extractors over one fetched page and classifies the outcome of
//! a fetch into one of three states:
//!
//! - `FreshOk`: the page yielded current state, today's forecast or stations
//! - `FreshEmpty`: the page was fetched but nothing usable came out of it
//! - `FetchFailed`: the page could not be fetched at all

use crate::error::{AppError, Result};
use crate::models::{MarkupConfig, Snapshot};
use crate::services::{BulletinParser, StationExtractor};

/// Classified outcome of one fetch.
#[derive(Debug)]
pub enum FetchState {
    /// Fresh snapshot with data
    FreshOk(Snapshot),
    /// Fresh snapshot with nothing in it
    FreshEmpty(Snapshot),
    /// Fetch error, after retries
    FetchFailed(AppError),
}

impl FetchState {
    pub fn label(&self) -> &'static str {
        match self {
            FetchState::FreshOk(_) => "FRESH_OK",
            FetchState::FreshEmpty(_) => "FRESH_EMPTY",
            FetchState::FetchFailed(_) => "FETCH_FAILED",
        }
    }
}

/// Combines the bulletin and station extractors.
#[derive(Debug, Clone)]
pub struct SnapshotAssembler {
    bulletin: BulletinParser,
    stations: StationExtractor,
}

impl SnapshotAssembler {
    pub fn new(markup: &MarkupConfig) -> Result<Self> {
        Ok(Self {
            bulletin: BulletinParser::new(markup)?,
            stations: StationExtractor::new(markup)?,
        })
    }

    /// Build a fresh snapshot from a raw page.
    pub fn assemble(&self, html: &str) -> Snapshot {
        let forecast = self.bulletin.parse(html);
        let stations = self.stations.extract(html);
        Snapshot::fresh(forecast, stations)
    }

    /// Classify a fetch result.
    pub fn classify(&self, fetched: Result<String>) -> FetchState {
        match fetched {
            Ok(html) => {
                let snapshot = self.assemble(&html);
                if snapshot.is_empty() {
                    FetchState::FreshEmpty(snapshot)
                } else {
                    FetchState::FreshOk(snapshot)
                }
            }
            Err(error) => FetchState::FetchFailed(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembler() -> SnapshotAssembler {
        SnapshotAssembler::new(&MarkupConfig::default()).unwrap()
    }

    #[test]
    fn test_stations_alone_are_enough() {
        let html = r#"<script>var vEstaciones = [[1,"San Luis",-33.3,-66.3,new Date(1),20.1,null]];</script>"#;
        let state = assembler().classify(Ok(html.to_string()));
        match state {
            FetchState::FreshOk(snapshot) => {
                assert_eq!(snapshot.stations.len(), 1);
                assert!(!snapshot.using_cache);
                assert!(snapshot.success);
            }
            other => panic!("expected FRESH_OK, got {}", other.label()),
        }
    }

    #[test]
    fn test_blank_page_is_fresh_empty() {
        let state = assembler().classify(Ok("<html><body></body></html>".to_string()));
        assert_eq!(state.label(), "FRESH_EMPTY");
    }

    #[test]
    fn test_extended_only_is_fresh_empty() {
        let html = r#"<span id="ContentPlaceHolder1_spanPronosticoGeneralTexto">
            <p>Pronóstico Extendido Lunes 3 de Marzo de 2025 Soleado.</p></span>"#;
        match assembler().classify(Ok(html.to_string())) {
            FetchState::FreshEmpty(snapshot) => {
                let forecast = snapshot.forecast.unwrap();
                assert_eq!(forecast.extended.len(), 1);
            }
            other => panic!("expected FRESH_EMPTY, got {}", other.label()),
        }
    }

    #[test]
    fn test_error_is_fetch_failed() {
        let state = assembler().classify(Err(AppError::config("down")));
        assert_eq!(state.label(), "FETCH_FAILED");
    }
}
