use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One log line as stored: time text, source key and payload text.
///
/// Batches keep these in the order they were read, which is also the raw
/// table's default order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RawRecord {
    pub time: String,
    pub source: String,
    pub value: String,
}

impl RawRecord {
    pub fn new(time: impl Into<String>, source: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            source: source.into(),
            value: value.into(),
        }
    }

    /// Text of the given table column (0 = time, 1 = source, 2 = value).
    #[must_use]
    pub fn cell(&self, column: usize) -> &str {
        match column {
            0 => &self.time,
            1 => &self.source,
            _ => &self.value,
        }
    }
}

/// A record reduced to a plot time and the numbers found in its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    /// Fractional hours since midnight (day axis) or day offset (week axis).
    pub time: f64,
    pub source: String,
    /// May be empty when the payload carries no number.
    pub readings: Vec<f64>,
}

/// Time domain of a plot and of the parser's time extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeAxis {
    /// Hours since midnight, `[0, 24]`.
    #[default]
    Day,
    /// Days since the first day of the week batch, `[0, 7]`.
    Week,
}

impl TimeAxis {
    /// Fixed x-domain `(x_min, x_max)` for this axis.
    #[must_use]
    pub const fn x_range(self) -> (f64, f64) {
        match self {
            Self::Day => (0.0, 24.0),
            Self::Week => (0.0, 7.0),
        }
    }
}
