//! Forecast-valid text normalization.
//!
//! Reference inventory rows phrase each layer's valid time relative to the
//! forecast hour the table was generated from (`"2 hour fcst"`,
//! `"0-2 hour acc fcst"`). [`ForecastValid::render`] re-derives the phrasing
//! for any other forecast hour in the same bucket.
//!
//! Recognized patterns, tried in order:
//!
//! | pattern | example | rendered at FH 48 |
//! |---|---|---|
//! | analysis | `anl`, `analysis` | unchanged |
//! | instantaneous | `3 hour fcst` | `48 hour fcst` |
//! | trailing window | `1-2 hour ave` | `47-48 hour ave` |
//! | window from zero | `0-24 hour acc` | `0-2 day acc` |

use std::fmt;

use hrrr_common::{HrrrError, HrrrResult};

const HOURS_PER_DAY: u32 = 24;

/// A parsed forecast-valid pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForecastValid {
    /// Analysis layer, independent of forecast hour.
    Analysis(String),
    /// `<value> <unit> fcst`
    Instantaneous { value: u32, unit: String },
    /// `<start>-<end> <unit> <statistic>[ <suffix>]`
    Window {
        start: u32,
        end: u32,
        unit: String,
        statistic: String,
        suffix: Option<String>,
    },
}

type Matcher = fn(&str, &[&str]) -> Option<ForecastValid>;

/// Pattern matchers, tried in sequence.
const MATCHERS: [Matcher; 3] = [match_analysis, match_instantaneous, match_window];

impl ForecastValid {
    /// Parse a reference-inventory pattern. Unrecognized patterns are an error.
    pub fn parse(pattern: &str) -> HrrrResult<Self> {
        let trimmed = pattern.trim();
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        MATCHERS
            .iter()
            .find_map(|matcher| matcher(trimmed, &tokens))
            .ok_or_else(|| HrrrError::PatternParse(pattern.to_string()))
    }

    /// Canonical forecast-time text for a specific forecast hour.
    pub fn render(&self, forecast_hour: u32) -> String {
        match self {
            ForecastValid::Analysis(text) => text.clone(),
            // Minute-unit rows (sub-hourly) also render in hours.
            ForecastValid::Instantaneous { .. } => format!("{} hour fcst", forecast_hour),
            ForecastValid::Window {
                start,
                unit,
                statistic,
                suffix,
                ..
            } => {
                let window = if *start == 1 {
                    format!(
                        "{}-{} {} {}",
                        forecast_hour.saturating_sub(1),
                        forecast_hour,
                        unit,
                        statistic
                    )
                } else if forecast_hour % HOURS_PER_DAY == 0 {
                    format!("0-{} day {}", forecast_hour / HOURS_PER_DAY, statistic)
                } else {
                    format!("0-{} {} {}", forecast_hour, unit, statistic)
                };
                match suffix {
                    Some(suffix) => format!("{} {}", window, suffix),
                    None => window,
                }
            }
        }
    }
}

impl fmt::Display for ForecastValid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastValid::Analysis(text) => f.write_str(text),
            ForecastValid::Instantaneous { value, unit } => write!(f, "{} {} fcst", value, unit),
            ForecastValid::Window {
                start,
                end,
                unit,
                statistic,
                suffix,
            } => {
                write!(f, "{}-{} {} {}", start, end, unit, statistic)?;
                if let Some(suffix) = suffix {
                    write!(f, " {}", suffix)?;
                }
                Ok(())
            }
        }
    }
}

/// Parse `pattern` and render it for `forecast_hour`.
pub fn format_forecast_valid(pattern: &str, forecast_hour: u32) -> HrrrResult<String> {
    Ok(ForecastValid::parse(pattern)?.render(forecast_hour))
}

fn match_analysis(trimmed: &str, _tokens: &[&str]) -> Option<ForecastValid> {
    match trimmed {
        "analysis" | "anl" => Some(ForecastValid::Analysis(trimmed.to_string())),
        _ => None,
    }
}

fn match_instantaneous(_trimmed: &str, tokens: &[&str]) -> Option<ForecastValid> {
    match tokens {
        [value, unit, "fcst"] if is_unit(unit) => Some(ForecastValid::Instantaneous {
            value: value.parse().ok()?,
            unit: unit.to_string(),
        }),
        _ => None,
    }
}

fn match_window(_trimmed: &str, tokens: &[&str]) -> Option<ForecastValid> {
    let [range, unit, statistic, rest @ ..] = tokens else {
        return None;
    };
    let (start, end) = range.split_once('-')?;
    let (start, end) = (start.parse::<u32>().ok()?, end.parse::<u32>().ok()?);
    if !is_unit(unit) || !is_statistic(statistic) {
        return None;
    }
    Some(ForecastValid::Window {
        start,
        end,
        unit: unit.to_string(),
        statistic: statistic.to_string(),
        suffix: (!rest.is_empty()).then(|| rest.join(" ")),
    })
}

fn is_unit(token: &str) -> bool {
    matches!(token, "min" | "hour" | "day")
}

fn is_statistic(token: &str) -> bool {
    token != "fcst" && !token.is_empty() && token.chars().all(|c| c.is_ascii_alphabetic())
}
