//! Snapshot and bulletin records.
//!
//! Field names follow Rust conventions; the serialized keys are the Spanish
//! keys consumers of the JSON snapshot already read.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::Station;

/// One complete result of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    #[serde(rename = "pronostico_general")]
    pub forecast: Option<Forecast>,

    #[serde(rename = "estaciones", default)]
    pub stations: Vec<Station>,

    #[serde(rename = "exito")]
    pub success: bool,

    #[serde(default)]
    pub error: Option<String>,

    #[serde(rename = "usando_cache", default)]
    pub using_cache: bool,

    /// Set when the snapshot was persisted
    #[serde(
        rename = "timestamp_guardado",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub saved_at: Option<DateTime<Utc>>,

    /// Fetch failure that caused a cached snapshot to be served
    #[serde(
        rename = "error_original",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub original_error: Option<String>,
}

impl Snapshot {
    /// A snapshot built from the current fetch.
    pub fn fresh(forecast: Forecast, stations: Vec<Station>) -> Self {
        Self {
            forecast: Some(forecast),
            stations,
            success: true,
            error: None,
            using_cache: false,
            saved_at: None,
            original_error: None,
        }
    }

    /// The only unsuccessful shape: no data at all, just the reason.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            forecast: None,
            stations: Vec::new(),
            success: false,
            error: Some(message.into()),
            using_cache: false,
            saved_at: None,
            original_error: None,
        }
    }

    /// Neither current state nor today's forecast, and no stations.
    pub fn is_empty(&self) -> bool {
        let forecast_empty = self.forecast.as_ref().is_none_or(|f| !f.has_core());
        forecast_empty && self.stations.is_empty()
    }

    /// Mark a persisted snapshot as served from the store.
    pub fn into_cached(mut self, cause: Option<String>) -> Self {
        self.using_cache = true;
        if let Some(cause) = cause {
            self.error = Some(cause.clone());
            self.original_error = Some(cause);
        }
        self
    }

    /// First station whose name contains `query`, ignoring case.
    pub fn find_station(&self, query: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.name_matches(query))
    }

    /// Stations with a current temperature, warmest first.
    pub fn stations_with_reading(&self) -> Vec<&Station> {
        let mut stations: Vec<&Station> =
            self.stations.iter().filter(|s| s.has_reading()).collect();
        stations.sort_by(|a, b| {
            b.temperature
                .unwrap_or_default()
                .total_cmp(&a.temperature.unwrap_or_default())
        });
        stations
    }

    pub fn stations_without_reading(&self) -> Vec<&Station> {
        self.stations.iter().filter(|s| !s.has_reading()).collect()
    }
}

/// Parse an RFC 3339 timestamp, or one without offset read as UTC.
fn parse_saved_at(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_saved_at(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'"))),
        None => Ok(None),
    }
}

/// The prose bulletin, split into its sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Forecast {
    #[serde(rename = "estado_actual")]
    pub current_state: Option<CurrentState>,

    #[serde(rename = "pronostico_hoy")]
    pub today: Option<TodayForecast>,

    /// Chronological, as published
    #[serde(rename = "pronostico_extendido", default)]
    pub extended: Vec<ExtendedDay>,

    #[serde(rename = "alerta_meteorologica")]
    pub alert: Option<Alert>,

    #[serde(rename = "informe_especial")]
    pub special_notice: Option<String>,
}

impl Forecast {
    /// At least one of current state / today is present.
    pub fn has_core(&self) -> bool {
        self.current_state.is_some() || self.today.is_some()
    }

    pub fn has_alert(&self) -> bool {
        self.alert.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentState {
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "cielo")]
    pub sky: String,
    #[serde(rename = "temperatura")]
    pub temperature_text: String,
    #[serde(rename = "viento")]
    pub wind: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodayForecast {
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "cielo")]
    pub sky: String,
    #[serde(rename = "viento")]
    pub wind: String,
    #[serde(rename = "temperatura_minima")]
    pub temp_min: Option<i32>,
    #[serde(rename = "temperatura_maxima")]
    pub temp_max: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtendedDay {
    #[serde(rename = "dia")]
    pub weekday: Weekday,
    /// "D de Mes de YYYY"
    #[serde(rename = "fecha")]
    pub date_label: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "temperatura_minima")]
    pub temp_min: Option<i32>,
    #[serde(rename = "temperatura_maxima")]
    pub temp_max: Option<i32>,
}

/// Active weather warning. Its presence is the signal; fields may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alert {
    #[serde(rename = "zona_afectada")]
    pub affected_zone: Option<String>,
    #[serde(rename = "horario")]
    pub issue_window: Option<String>,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
}

/// Canonical Spanish weekday names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Weekday {
    #[serde(rename = "Domingo")]
    Sunday,
    #[serde(rename = "Lunes")]
    Monday,
    #[serde(rename = "Martes")]
    Tuesday,
    #[serde(rename = "Miércoles")]
    Wednesday,
    #[serde(rename = "Jueves")]
    Thursday,
    #[serde(rename = "Viernes")]
    Friday,
    #[serde(rename = "Sábado")]
    Saturday,
}

impl Weekday {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Sunday => "Domingo",
            Weekday::Monday => "Lunes",
            Weekday::Tuesday => "Martes",
            Weekday::Wednesday => "Miércoles",
            Weekday::Thursday => "Jueves",
            Weekday::Friday => "Viernes",
            Weekday::Saturday => "Sábado",
        }
    }

    /// Resolve a bulletin token, tolerating case, missing accents and the
    /// known "Vienes" typo.
    pub fn from_token(token: &str) -> Option<Self> {
        match crate::utils::fold_accents(token).to_lowercase().as_str() {
            "domingo" => Some(Weekday::Sunday),
            "lunes" => Some(Weekday::Monday),
            "martes" => Some(Weekday::Tuesday),
            "miercoles" => Some(Weekday::Wednesday),
            "jueves" => Some(Weekday::Thursday),
            "viernes" | "vienes" => Some(Weekday::Friday),
            "sabado" => Some(Weekday::Saturday),
            _ => None,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
