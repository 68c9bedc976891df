use regex::Regex;
use std::sync::LazyLock;

use super::record::{ParsedRecord, RawRecord, TimeAxis};

/// Optionally signed decimal: digits with an optional point and fraction,
/// or a bare fraction such as `.5`.
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?([0-9]+\.?[0-9]*|\.?[0-9]+)").expect("number pattern"));

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit pattern"));

/// Turns raw log lines into plot times and readings. Parsing never fails:
/// missing numbers degrade to a zero time or an empty reading list.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineParser {
    axis: TimeAxis,
}

impl LineParser {
    #[must_use]
    pub const fn new(axis: TimeAxis) -> Self {
        Self { axis }
    }

    #[must_use]
    pub const fn axis(&self) -> TimeAxis {
        self.axis
    }

    #[must_use]
    pub fn parse(&self, raw: &RawRecord) -> ParsedRecord {
        let time = match self.axis {
            TimeAxis::Day => fractional_hours(&raw.time),
            TimeAxis::Week => day_offset(&raw.time),
        };

        ParsedRecord {
            time,
            source: raw.source.clone(),
            readings: readings(&raw.value),
        }
    }

    pub fn parse_batch<'a>(&self, batch: impl IntoIterator<Item = &'a RawRecord>) -> Vec<ParsedRecord> {
        batch.into_iter().map(|raw| self.parse(raw)).collect()
    }
}

/// Folds the digit groups of a clock string into hours, seconds nested in
/// minutes nested in hours: `"12:30:00"` is `12.5`. No digits gives `0`.
#[must_use]
pub fn fractional_hours(text: &str) -> f64 {
    let components: Vec<f64> = DIGITS
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect();

    components
        .iter()
        .rev()
        .fold(0.0, |acc, component| component + acc / 60.0)
}

/// Week batches carry the time as one number of days.
#[must_use]
pub fn day_offset(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite())
        .unwrap_or(0.0)
}

/// Every number in the payload, left to right. Units and labels are ignored
/// and a leading `-` is kept. Digit runs too long for an `f64` are dropped.
#[must_use]
pub fn readings(text: &str) -> Vec<f64> {
    NUMBER
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .collect()
}
