use serde::Serialize;
use utoipa::ToSchema;

use crate::analysis::{Column, Direction, RawRecord, SortState};

use super::table::{HeaderCell, Table, TableBuilder};

/// Raw-data table in its persisted sort order.
#[derive(Debug, Serialize, ToSchema)]
pub struct DataView {
    /// `[column, direction]` as stored in the session.
    #[schema(value_type = Vec<i64>, example = json!([0, 1]))]
    pub sort: SortState,
    pub table: Table,
}

impl DataView {
    /// `records` must already be ordered by `sort`.
    #[must_use]
    pub fn new(records: &[RawRecord], sort: SortState) -> Self {
        let header = Column::ALL
            .into_iter()
            .map(|column| HeaderCell {
                label: column.title().to_string(),
                column: Some(column.index()),
                marker: (column == sort.column).then(|| sort_marker(sort.direction).to_string()),
            })
            .collect();

        let mut builder = TableBuilder::new().header_cells(header);
        for record in records {
            builder.push_row([&record.time, &record.source, &record.value]);
        }

        Self {
            sort,
            table: builder.build(),
        }
    }
}

const fn sort_marker(direction: Direction) -> &'static str {
    match direction {
        Direction::Ascending => "\u{2191}",
        Direction::Descending => "\u{2193}",
    }
}
