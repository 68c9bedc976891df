use serde::Serialize;
use utoipa::ToSchema;

use crate::analysis::{LineParser, RawRecord, RunningStat, StatAggregator, TimeAxis};

use super::table::TableBuilder;
use super::Table;

/// One statistic as numbers; `None` fields mean "no data" (`readings == 0`).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StatSummary {
    pub name: String,
    pub lines: u64,
    pub readings: u64,
    pub mean: Option<f64>,
    pub stddev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl From<&RunningStat> for StatSummary {
    fn from(stat: &RunningStat) -> Self {
        let range = stat.range();
        Self {
            name: stat.name().to_string(),
            lines: stat.lines(),
            readings: stat.count(),
            mean: stat.mean(),
            stddev: stat.stddev(),
            min: range.map(|(min, _)| min),
            max: range.map(|(_, max)| max),
        }
    }
}

/// Statistics summary: every source in first-seen order, then "All".
#[derive(Debug, Serialize, ToSchema)]
pub struct StatView {
    pub sources: Vec<StatSummary>,
    pub all: StatSummary,
    pub table: Table,
}

impl StatView {
    #[must_use]
    pub fn new(records: &[RawRecord]) -> Self {
        let parsed = LineParser::new(TimeAxis::Day).parse_batch(records);
        Self::from_aggregator(&StatAggregator::from_records(&parsed))
    }

    #[must_use]
    pub fn from_aggregator(aggregator: &StatAggregator) -> Self {
        let mut builder = TableBuilder::new().header(["Source", "Types", "Values"]);
        for stat in aggregator.stats().chain([aggregator.all()]) {
            push_stat_rows(&mut builder, stat);
        }

        Self {
            sources: aggregator.stats().map(StatSummary::from).collect(),
            all: StatSummary::from(aggregator.all()),
            table: builder.build(),
        }
    }
}

fn push_stat_rows(builder: &mut TableBuilder, stat: &RunningStat) {
    builder.push_row([
        stat.name().to_string(),
        "Lines, Readings".to_string(),
        format!("{}, {}", stat.lines(), stat.count()),
    ]);

    let spread = stat
        .mean()
        .zip(stat.stddev())
        .map(|(mean, std)| format!("{mean:.2} ({std:.2})"))
        .unwrap_or_default();
    builder.push_row([String::new(), "Avg (Std)".to_string(), spread]);

    let range = stat
        .range()
        .map(|(min, max)| format!("{min} \u{2014} {max}"))
        .unwrap_or_default();
    builder.push_row([String::new(), "Range".to_string(), range]);
}
