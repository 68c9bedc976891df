use serde::Serialize;
use utoipa::ToSchema;

/// Header cell of a rendered table. `marker` carries the sort arrow of a
/// sortable column, `column` its index for click-to-sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HeaderCell {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Table {
    pub header: Vec<HeaderCell>,
    pub rows: Vec<Vec<String>>,
}

/// Row rendering shared by the raw-data and statistics presenters.
#[derive(Debug, Default)]
pub struct TableBuilder {
    table: Table,
}

impl TableBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain, non-sortable header.
    #[must_use]
    pub fn header<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table.header = labels
            .into_iter()
            .map(|label| HeaderCell {
                label: label.into(),
                column: None,
                marker: None,
            })
            .collect();
        self
    }

    #[must_use]
    pub fn header_cells(mut self, cells: Vec<HeaderCell>) -> Self {
        self.table.header = cells;
        self
    }

    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table.rows.push(cells.into_iter().map(Into::into).collect());
    }

    #[must_use]
    pub fn build(self) -> Table {
        self.table
    }
}
