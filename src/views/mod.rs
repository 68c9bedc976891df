//! Presenters turning one batch into the model a page renders.

pub mod data;
pub mod plot;
pub mod stat;
pub mod table;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::analysis::TimeAxis;

pub use data::DataView;
pub use plot::{PlotOptions, PlotView};
pub use stat::StatView;
pub use table::{HeaderCell, Table, TableBuilder};

/// Page mode selected by the `type` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Data,
    Stat,
    Plot,
    Week,
}

impl ViewMode {
    /// Unknown or missing modes fall back to the raw table.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::to_lowercase).as_deref() {
            Some("stat") => Self::Stat,
            Some("plot") => Self::Plot,
            Some("week") => Self::Week,
            _ => Self::Data,
        }
    }

    /// Week mode loads a seven-day batch with day-offset times.
    #[must_use]
    pub const fn time_axis(self) -> TimeAxis {
        match self {
            Self::Week => TimeAxis::Week,
            _ => TimeAxis::Day,
        }
    }
}

/// Body of `GET /api/view`, tagged by mode.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ViewResponse {
    Data(DataView),
    Stat(StatView),
    Plot(PlotView),
    Week(PlotView),
}
