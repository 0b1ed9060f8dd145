// src/services/temperatures.rs

//! Minimum/maximum temperature inference from bulletin prose.
//!
//! Two passes: first look for a number introduced by a "mínima"/"máxima"
//! style phrase; then, for whichever bound is still missing, fall back to
//! every degree-marked number in the text.

use regex::Regex;

use crate::error::Result;

const DEGREE_NUMBER: &str = r"(\d+)[°ºC]+";

/// What to do when the fallback pass finds exactly one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoneReading {
    /// Use it as the maximum if the maximum is still unknown.
    AsMax,
    /// Use it for the missing bound only when the other bound is known and
    /// the ordering holds; otherwise drop it.
    IfConsistent,
}

/// Compiled patterns for one flavor of bulletin text.
#[derive(Debug, Clone)]
pub struct TemperatureRules {
    min: Regex,
    max: Regex,
    degree: Regex,
    lone: LoneReading,
}

impl TemperatureRules {
    /// Rules for the "Pronóstico para Hoy" block.
    pub fn today() -> Result<Self> {
        Ok(Self {
            min: Regex::new(
                r"(?:m[íi]nimas?|m[íi]nima|mín\.|min\.|estarán en torno a los)\s*(?:de|en torno a|serán de)?\s*(\d+)[°ºC]+",
            )?,
            max: Regex::new(
                r"(?:m[áa]ximas?|m[áa]xima|m[áa]x\.|max\.|alcanzarán)\s*(?:de|los|serán de)?\s*(\d+)[°ºC]+",
            )?,
            degree: Regex::new(DEGREE_NUMBER)?,
            lone: LoneReading::AsMax,
        })
    }

    /// Rules for one extended-forecast day.
    pub fn extended() -> Result<Self> {
        Ok(Self {
            min: Regex::new(
                r"(?:m[íi]nimas?|m[íi]nima|mín\.|min\.)\s*(?:ser[áa]n?|de|est[áa]n?)?\s*de?\s*(\d+)[°ºC]+",
            )?,
            max: Regex::new(
                r"(?:m[áa]ximas?|m[áa]xima|m[áa]x\.|max\.)\s*(?:ser[áa]n?|de|est[áa]n?|alcanzar[áa]n?)?\s*de?\s*(\d+)[°ºC]+",
            )?,
            degree: Regex::new(DEGREE_NUMBER)?,
            lone: LoneReading::IfConsistent,
        })
    }

    /// Infer `(temp_min, temp_max)` from `text`.
    ///
    /// When both bounds are found they are returned in ascending order.
    pub fn infer(&self, text: &str) -> (Option<i32>, Option<i32>) {
        let lower = text.to_lowercase();
        let mut min = first_number(&self.min, &lower);
        let mut max = first_number(&self.max, &lower);

        if min.is_none() || max.is_none() {
            let found: Vec<i32> = self
                .degree
                .captures_iter(text)
                .filter_map(|caps| caps[1].parse().ok())
                .collect();

            match found.as_slice() {
                [] => {}
                [only] => match self.lone {
                    LoneReading::AsMax => {
                        if max.is_none() {
                            max = Some(*only);
                        }
                    }
                    LoneReading::IfConsistent => match (min, max) {
                        (None, Some(hi)) if *only < hi => min = Some(*only),
                        (Some(lo), None) if *only > lo => max = Some(*only),
                        _ => {}
                    },
                },
                many => {
                    if min.is_none() {
                        min = many.iter().copied().min();
                    }
                    if max.is_none() {
                        max = many.iter().copied().max();
                    }
                }
            }
        }

        ordered(min, max)
    }
}

fn first_number(pattern: &Regex, text: &str) -> Option<i32> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn ordered(min: Option<i32>, max: Option<i32>) -> (Option<i32>, Option<i32>) {
    match (min, max) {
        (Some(lo), Some(hi)) if lo > hi => (Some(hi), Some(lo)),
        other => other,
    }
}
