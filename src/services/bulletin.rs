// src/services/bulletin.rs

//! Bulletin text extractor.
//!
//! Reads the prose forecast container of the bulletin page and splits it
//! into current state, today's forecast, extended days, special notice and
//! weather alert.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::Result;
use crate::models::{
    Alert, CurrentState, ExtendedDay, Forecast, MarkupConfig, TodayForecast, Weekday,
    parse_selector,
};
use crate::services::temperatures::TemperatureRules;
use crate::utils::{fold_accents, normalize_whitespace, section_between};

const CURRENT_TITLE: &str = "Estado del Tiempo Actual";
const TODAY_TITLES: [&str; 2] = ["Pronóstico para Hoy", "Prónostico para Hoy"];
const EXTENDED_MARKER: &str = "Pronóstico Extendido";
const SPECIAL_MARKER: &str = "INFORME ESPECIAL";
const SPECIAL_END: &str = "ALERTA";
const ALERT_MARKER_FOLDED: &str = "ALERTA METEOROLOGICA";

/// Parses the prose bulletin into a `Forecast`.
#[derive(Debug, Clone)]
pub struct BulletinParser {
    container: Selector,
    title: Selector,
    detail: Selector,
    today_temps: TemperatureRules,
    extended_temps: TemperatureRules,
    day_header: Regex,
    day_typos: Vec<(Regex, &'static str)>,
    alert_zone: Regex,
    alert_window: Regex,
    alert_description: Regex,
}

impl BulletinParser {
    /// Compile selectors and patterns.
    pub fn new(markup: &MarkupConfig) -> Result<Self> {
        Ok(Self {
            container: parse_selector(&markup.container_selector)?,
            title: parse_selector(&markup.title_selector)?,
            detail: parse_selector(&markup.detail_selector)?,
            today_temps: TemperatureRules::today()?,
            extended_temps: TemperatureRules::extended()?,
            day_header: Regex::new(
                r"(?i)(Domingo|Lunes|Martes|Mi[ée]rcoles|Jueves|Viernes|Vienes|S[áa]bado)\s+(\d{1,2})\s+de\s+(\w+)\s+de\s+(\d{4})",
            )?,
            day_typos: vec![
                (Regex::new(r"(?i)\bVienes\b")?, "Viernes"),
                (Regex::new(r"(?i)\bMiercoles\b")?, "Miércoles"),
                (Regex::new(r"(?i)\bSabado\b")?, "Sábado"),
            ],
            alert_zone: Regex::new(r"(?i)Zona afectada:\s*(.+?)(?:\.|Horario|$)")?,
            alert_window: Regex::new(r"(?i)Horario de emisi[óo]n:\s*(.+?)(?:\.|Se prev[ée]|$)")?,
            alert_description: Regex::new(r"(?is)Se prev[ée]\s+(.+?)(?:Pron[óo]stico|$)")?,
        })
    }

    /// Parse a raw page.
    pub fn parse(&self, html: &str) -> Forecast {
        self.parse_document(&Html::parse_document(html))
    }

    /// Parse an already-built document.
    ///
    /// A missing container yields a `Forecast` with every field absent.
    pub fn parse_document(&self, document: &Html) -> Forecast {
        let Some(container) = document.select(&self.container).next() else {
            log::warn!("Bulletin container not found; forecast left empty");
            return Forecast::default();
        };

        let mut forecast = Forecast::default();

        // Titles and details pair up by position.
        let titles = container.select(&self.title);
        let details = container.select(&self.detail);
        for (title, detail) in titles.zip(details) {
            let title_text = normalize_whitespace(&title.text().collect::<String>());
            let detail_text = block_text(detail);

            if title_text.contains(CURRENT_TITLE) {
                forecast.current_state = Some(parse_current_state(&detail_text));
            } else if TODAY_TITLES.iter().any(|t| title_text.contains(t)) {
                forecast.today = Some(self.parse_today(&detail_text));
            }
        }

        let full_text: String = container.text().collect();

        if full_text.contains(SPECIAL_MARKER) {
            forecast.special_notice = section_between(&full_text, SPECIAL_MARKER, SPECIAL_END);
        }

        if fold_accents(&full_text).contains(ALERT_MARKER_FOLDED) {
            forecast.alert = Some(self.parse_alert(&full_text));
        }

        forecast.extended = self.parse_extended(&full_text);

        log::debug!(
            "Bulletin parsed: current={} today={} extended_days={} alert={}",
            forecast.current_state.is_some(),
            forecast.today.is_some(),
            forecast.extended.len(),
            forecast.alert.is_some()
        );

        forecast
    }

    fn parse_today(&self, text: &str) -> TodayForecast {
        let (temp_min, temp_max) = self.today_temps.infer(text);
        let mut today = TodayForecast {
            temp_min,
            temp_max,
            ..TodayForecast::default()
        };

        let mut description = Vec::new();
        for line in lines(text) {
            if line.starts_with(EXTENDED_MARKER) {
                break;
            }
            let lower = line.to_lowercase();
            if lower.contains("viento") {
                today.wind = line;
            } else if lower.contains("cielo") {
                today.sky = line;
            } else {
                description.push(line);
            }
        }
        today.description = description.join(" ");
        today
    }

    fn parse_alert(&self, text: &str) -> Alert {
        Alert {
            affected_zone: capture_text(&self.alert_zone, text),
            issue_window: capture_text(&self.alert_window, text),
            description: capture_text(&self.alert_description, text),
        }
    }

    fn parse_extended(&self, text: &str) -> Vec<ExtendedDay> {
        let Some(start) = text.find(EXTENDED_MARKER) else {
            return Vec::new();
        };

        let mut section = text[start..].to_string();
        for (typo, fix) in &self.day_typos {
            section = typo.replace_all(&section, *fix).into_owned();
        }

        let headers: Vec<_> = self.day_header.captures_iter(&section).collect();
        let mut days = Vec::with_capacity(headers.len());

        for (i, caps) in headers.iter().enumerate() {
            let Some(header) = caps.get(0) else { continue };
            let Some(weekday) = Weekday::from_token(&caps[1]) else {
                continue;
            };

            let end = headers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(section.len(), |m| m.start());
            let body = section[header.end()..end].trim();
            let (temp_min, temp_max) = self.extended_temps.infer(body);

            days.push(ExtendedDay {
                weekday,
                date_label: format!("{} de {} de {}", &caps[2], &caps[3], &caps[4]),
                description: normalize_whitespace(body),
                temp_min,
                temp_max,
            });
        }

        days
    }
}

fn parse_current_state(text: &str) -> CurrentState {
    let mut state = CurrentState::default();
    let mut description = Vec::new();

    for line in lines(text) {
        if line.starts_with("INFORME") {
            break;
        }
        let lower = line.to_lowercase();
        if lower.contains("cielo") {
            state.sky = line;
        } else if lower.contains("temperatura") {
            state.temperature_text = line;
        } else if lower.contains("viento") {
            state.wind = line;
        } else {
            description.push(line);
        }
    }

    state.description = description.join(" ");
    state
}

/// Text nodes of an element, one per line.
fn block_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join("\n")
}

/// Non-blank, whitespace-normalized lines.
fn lines(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines()
        .map(normalize_whitespace)
        .filter(|line| !line.is_empty())
}

fn capture_text(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| normalize_whitespace(m.as_str()))
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<span id="ContentPlaceHolder1_spanPronosticoGeneralTexto">
  <p class="PronosticoGeneralTitulo">Estado del Tiempo Actual</p>
  <p class="PronosticoGeneralDetalle">Jornada   estable en la provincia.<br/>
    Cielo parcialmente nublado.<br/>
    Temperatura actual templada.<br/>
    Viento leve del sector norte.<br/>
    Humedad en descenso.<br/>
    INFORME DE LA MAÑANA<br/>
    Esto no debe aparecer.</p>
  <p class="PronosticoGeneralTitulo">Prónostico para Hoy</p>
  <p class="PronosticoGeneralDetalle">Ascenso de la temperatura.<br/>
    Máxima de 27°C.<br/>
    Mínima de 12°C.<br/>
    Cielo despejado.<br/>
    Viento moderado del sur.<br/>
    Pronóstico Extendido<br/>
    Lunes 3 de Marzo de 2025</p>
  <p>INFORME ESPECIAL: ola de calor en el norte provincial. ALERTA METEOROLÓGICA
  Zona afectada: Norte de San Luis. Horario de emisión: 10 hs. Se prevé tormentas fuertes con granizo. Pronóstico Extendido
  Vienes 7 de Marzo de 2025 Inestable. Mínima de 14°C, máxima de 26°C.
  Sabado 8 de Marzo de 2025 Caluroso con 31°C.
  Miercoles 12 de Marzo de 2025 Templado entre 16° y 25°.</p>
</span>
<script>var vEstaciones = [];</script>
</body></html>
"#;

    fn parser() -> BulletinParser {
        BulletinParser::new(&MarkupConfig::default()).unwrap()
    }

    #[test]
    fn test_current_state_lines() {
        let forecast = parser().parse(PAGE);
        let current = forecast.current_state.unwrap();
        assert_eq!(current.sky, "Cielo parcialmente nublado.");
        assert_eq!(current.temperature_text, "Temperatura actual templada.");
        assert_eq!(current.wind, "Viento leve del sector norte.");
        assert_eq!(
            current.description,
            "Jornada estable en la provincia. Humedad en descenso."
        );
    }

    #[test]
    fn test_today_with_typo_title() {
        let forecast = parser().parse(PAGE);
        let today = forecast.today.unwrap();
        assert_eq!(today.temp_min, Some(12));
        assert_eq!(today.temp_max, Some(27));
        assert_eq!(today.sky, "Cielo despejado.");
        assert_eq!(today.wind, "Viento moderado del sur.");
        assert_eq!(
            today.description,
            "Ascenso de la temperatura. Máxima de 27°C. Mínima de 12°C."
        );
    }

    #[test]
    fn test_special_notice_and_alert() {
        let forecast = parser().parse(PAGE);
        assert_eq!(
            forecast.special_notice.as_deref(),
            Some("INFORME ESPECIAL: ola de calor en el norte provincial.")
        );

        let alert = forecast.alert.unwrap();
        assert_eq!(alert.affected_zone.as_deref(), Some("Norte de San Luis"));
        assert_eq!(alert.issue_window.as_deref(), Some("10 hs"));
        assert_eq!(
            alert.description.as_deref(),
            Some("tormentas fuertes con granizo.")
        );
    }

    #[test]
    fn test_extended_days_are_canonical_and_ordered() {
        let forecast = parser().parse(PAGE);
        let days = &forecast.extended;
        let names: Vec<&str> = days.iter().map(|d| d.weekday.as_str()).collect();
        assert_eq!(names, vec!["Lunes", "Viernes", "Sábado", "Miércoles"]);

        assert_eq!(days[1].date_label, "7 de Marzo de 2025");
        assert_eq!(days[1].temp_min, Some(14));
        assert_eq!(days[1].temp_max, Some(26));
        assert_eq!(
            days[1].description,
            "Inestable. Mínima de 14°C, máxima de 26°C."
        );

        // A lone number with no context is left out.
        assert_eq!(days[2].temp_min, None);
        assert_eq!(days[2].temp_max, None);

        assert_eq!(days[3].temp_min, Some(16));
        assert_eq!(days[3].temp_max, Some(25));
    }

    #[test]
    fn test_missing_container_yields_empty_forecast() {
        let forecast = parser().parse("<html><body><p>Mantenimiento</p></body></html>");
        assert_eq!(forecast, Forecast::default());
    }

    #[test]
    fn test_unaccented_alert_marker() {
        let page = r#"<span id="ContentPlaceHolder1_spanPronosticoGeneralTexto">
            <p>ALERTA METEOROLOGICA Zona afectada: Valle del Conlara.</p></span>"#;
        let alert = parser().parse(page).alert.unwrap();
        assert_eq!(alert.affected_zone.as_deref(), Some("Valle del Conlara"));
        assert!(alert.issue_window.is_none());
        assert!(alert.description.is_none());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let parser = parser();
        let first = serde_json::to_string(&parser.parse(PAGE)).unwrap();
        let second = serde_json::to_string(&parser.parse(PAGE)).unwrap();
        assert_eq!(first, second);
    }
}
