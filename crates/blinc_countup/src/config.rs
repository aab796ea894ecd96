//! Option resolution and input validation
//!
//! An engine carries a full set of [`CountUpDefaults`]. Each configure call
//! layers a sparse [`CountUpOptions`] over those defaults and produces an
//! immutable [`AnimationConfig`]; overrides never accumulate across calls.

use serde::Deserialize;
use std::fmt;

use crate::easing::Easing;
use crate::error::{CountUpError, Result};
use crate::format::{CustomFormatter, NumberFormat};

/// A start or end value as supplied by the caller, before validation
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{n}"),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

/// Coerce a raw value to a finite number.
///
/// Text is trimmed before parsing. Empty text, NaN and infinities are
/// rejected with an error naming the offending input.
pub fn parse_value(raw: &RawValue) -> Result<f64> {
    let parsed = match raw {
        RawValue::Number(n) => Some(*n),
        RawValue::Text(s) => s.trim().parse::<f64>().ok(),
    };
    match parsed {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(CountUpError::InvalidValue {
            raw: raw.to_string(),
        }),
    }
}

/// Instance defaults that every configure call starts from
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CountUpDefaults {
    pub start_value: f64,
    pub end_value: f64,
    pub decimal_places: i32,
    /// Animation duration in seconds
    pub duration: f64,
    pub use_grouping: bool,
    pub use_easing: bool,
    /// Distances above this are split into a linear run and an eased settle
    pub smart_easing_threshold: f64,
    /// Length of the eased settle for split runs
    pub smart_easing_amount: f64,
    pub separator: String,
    pub decimal: String,
    pub prefix: String,
    pub suffix: String,
    pub numerals: Vec<String>,
}

impl Default for CountUpDefaults {
    fn default() -> Self {
        Self {
            start_value: 0.0,
            end_value: 0.0,
            decimal_places: 0,
            duration: 2.0,
            use_grouping: true,
            use_easing: true,
            smart_easing_threshold: 999.0,
            smart_easing_amount: 333.0,
            separator: ",".to_string(),
            decimal: ".".to_string(),
            prefix: String::new(),
            suffix: String::new(),
            numerals: Vec::new(),
        }
    }
}

/// Per-call overrides; unset fields fall back to [`CountUpDefaults`]
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CountUpOptions {
    pub start_value: Option<RawValue>,
    pub decimal_places: Option<i32>,
    pub duration: Option<f64>,
    pub use_grouping: Option<bool>,
    pub use_easing: Option<bool>,
    pub smart_easing_threshold: Option<f64>,
    pub smart_easing_amount: Option<f64>,
    pub separator: Option<String>,
    pub decimal: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub numerals: Option<Vec<String>>,
    pub easing: Option<Easing>,
    #[serde(skip)]
    pub formatter: Option<CustomFormatter>,
}

impl CountUpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_value(mut self, value: impl Into<RawValue>) -> Self {
        self.start_value = Some(value.into());
        self
    }

    pub fn decimal_places(mut self, places: i32) -> Self {
        self.decimal_places = Some(places);
        self
    }

    /// Duration in seconds; zero or negative jumps straight to the end value
    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn use_grouping(mut self, enabled: bool) -> Self {
        self.use_grouping = Some(enabled);
        self
    }

    pub fn use_easing(mut self, enabled: bool) -> Self {
        self.use_easing = Some(enabled);
        self
    }

    pub fn smart_easing(mut self, threshold: f64, amount: f64) -> Self {
        self.smart_easing_threshold = Some(threshold);
        self.smart_easing_amount = Some(amount);
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn decimal(mut self, decimal: impl Into<String>) -> Self {
        self.decimal = Some(decimal.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn numerals<I, S>(mut self, glyphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numerals = Some(glyphs.into_iter().map(Into::into).collect());
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn formatter<F>(mut self, f: F) -> Self
    where
        F: Fn(f64) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(CustomFormatter::new(f));
        self
    }
}

/// Fully resolved animation options
#[derive(Clone, Debug)]
pub struct AnimationConfig {
    /// Configured start value, validated again on every reset
    pub start_value: RawValue,
    pub duration_seconds: f64,
    pub use_easing: bool,
    pub smart_easing_threshold: f64,
    pub smart_easing_amount: f64,
    pub number_format: NumberFormat,
    pub formatter: Option<CustomFormatter>,
    pub easing: Easing,
}

impl AnimationConfig {
    /// Layer `overrides` over `defaults`
    pub fn resolve(defaults: &CountUpDefaults, overrides: &CountUpOptions) -> Self {
        let decimal_places = overrides
            .decimal_places
            .unwrap_or(defaults.decimal_places)
            .max(0) as u32;

        let separator = overrides
            .separator
            .clone()
            .unwrap_or_else(|| defaults.separator.clone());
        let use_grouping =
            overrides.use_grouping.unwrap_or(defaults.use_grouping) && !separator.is_empty();

        Self {
            start_value: overrides
                .start_value
                .clone()
                .unwrap_or(RawValue::Number(defaults.start_value)),
            duration_seconds: overrides.duration.unwrap_or(defaults.duration),
            use_easing: overrides.use_easing.unwrap_or(defaults.use_easing),
            smart_easing_threshold: overrides
                .smart_easing_threshold
                .unwrap_or(defaults.smart_easing_threshold),
            smart_easing_amount: overrides
                .smart_easing_amount
                .unwrap_or(defaults.smart_easing_amount),
            number_format: NumberFormat {
                decimal_places,
                use_grouping,
                grouping_separator: separator,
                decimal_separator: overrides
                    .decimal
                    .clone()
                    .unwrap_or_else(|| defaults.decimal.clone()),
                prefix: overrides
                    .prefix
                    .clone()
                    .unwrap_or_else(|| defaults.prefix.clone()),
                suffix: overrides
                    .suffix
                    .clone()
                    .unwrap_or_else(|| defaults.suffix.clone()),
                numerals: overrides
                    .numerals
                    .clone()
                    .unwrap_or_else(|| defaults.numerals.clone()),
            },
            formatter: overrides.formatter.clone(),
            easing: overrides.easing.clone().unwrap_or_default(),
        }
    }

    #[inline]
    pub fn decimal_places(&self) -> u32 {
        self.number_format.decimal_places
    }

    /// `10^decimal_places`, used to round frame values
    #[inline]
    pub fn decimal_mult(&self) -> f64 {
        10f64.powi(self.decimal_places() as i32)
    }

    #[inline]
    pub fn duration_ms(&self) -> f64 {
        self.duration_seconds * 1000.0
    }

    /// Round `value` to the configured number of decimal places
    pub fn round(&self, value: f64) -> f64 {
        let mult = self.decimal_mult();
        (value * mult + 0.5).floor() / mult
    }

    /// Interpret text already shown on a target as a start value.
    ///
    /// Plain numbers are accepted first, then text in this config's own
    /// display format.
    pub fn parse_displayed(&self, text: &str) -> Option<f64> {
        parse_value(&RawValue::from(text))
            .ok()
            .or_else(|| self.number_format.parse(text))
    }

    /// Format a frame value with the custom formatter, if any, or the default one
    pub fn format_value(&self, value: f64) -> String {
        match &self.formatter {
            Some(formatter) => formatter.call(value),
            None => self.number_format.format(value),
        }
    }
}
