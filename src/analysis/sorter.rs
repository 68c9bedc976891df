//! Raw table ordering with a sort order that survives for the session.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::record::RawRecord;

/// Session key under which the sort order is stored.
pub const SORT_ORDER_KEY: &str = "sortorder";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Time,
    Source,
    Value,
}

impl Column {
    pub const ALL: [Self; 3] = [Self::Time, Self::Source, Self::Value];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Time => 0,
            Self::Source => 1,
            Self::Value => 2,
        }
    }

    #[must_use]
    pub const fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Time),
            1 => Some(Self::Source),
            2 => Some(Self::Value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Time => "Time",
            Self::Source => "Source",
            Self::Value => "Data",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    #[must_use]
    pub const fn sign(self) -> i64 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }

    #[must_use]
    pub const fn from_sign(sign: i64) -> Option<Self> {
        match sign {
            1 => Some(Self::Ascending),
            -1 => Some(Self::Descending),
            _ => None,
        }
    }

    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Column and direction of the raw table. Serialized as the two-element
/// array `[column, direction]`, e.g. `[0,1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortState {
    pub column: Column,
    pub direction: Direction,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: Column::Time,
            direction: Direction::Ascending,
        }
    }
}

impl Serialize for SortState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.column.index() as i64, self.direction.sign()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SortState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (column, sign) = <(i64, i64)>::deserialize(deserializer)?;
        Ok(Self {
            column: Column::from_index(column)
                .ok_or_else(|| D::Error::custom(format!("column {column} out of range")))?,
            direction: Direction::from_sign(sign)
                .ok_or_else(|| D::Error::custom(format!("direction {sign} is not 1 or -1")))?,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SortStateError {
    #[error("Corrupt sort state {value:?}: {source}")]
    Corrupt {
        value: String,
        #[source]
        source: serde_json::Error,
    },
}

impl SortState {
    /// State after a user request: the same column flips direction, another
    /// column starts ascending, no request keeps the current state.
    #[must_use]
    pub fn request(self, requested: Option<Column>) -> Self {
        match requested {
            None => self,
            Some(column) if column == self.column => Self {
                column,
                direction: self.direction.flipped(),
            },
            Some(column) => Self {
                column,
                direction: Direction::Ascending,
            },
        }
    }

    /// Reads the persisted state; a missing entry yields the default.
    ///
    /// # Errors
    ///
    /// Returns `SortStateError::Corrupt` if the stored entry is not a valid
    /// `[column, direction]` array.
    pub fn load(session: &impl SessionStore) -> Result<Self, SortStateError> {
        match session.get_item(SORT_ORDER_KEY) {
            None => Ok(Self::default()),
            Some(value) => serde_json::from_str(&value)
                .map_err(|source| SortStateError::Corrupt { value, source }),
        }
    }

    pub fn save(&self, session: &mut impl SessionStore) {
        session.set_item(SORT_ORDER_KEY, self.to_session_value());
    }

    #[must_use]
    pub fn to_session_value(&self) -> String {
        format!("[{},{}]", self.column.index(), self.direction.sign())
    }
}

/// String key-value store scoped to one browsing session.
pub trait SessionStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: String);
}

/// In-memory session, also the value kept per session id by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySession {
    items: HashMap<String, String>,
}

impl SessionStore for MemorySession {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) {
        self.items.insert(key.to_string(), value);
    }
}

/// Orders raw records by one column.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableSorter;

impl TableSorter {
    /// Applies `requested` to `current`, sorts `records` stably and returns
    /// the resulting state.
    pub fn sort(records: &mut [RawRecord], requested: Option<Column>, current: SortState) -> SortState {
        let state = current.request(requested);
        let column = state.column.index();

        records.sort_by(|a, b| {
            let ordering = locale_compare(a.cell(column), b.cell(column));
            match state.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });
        state
    }

    /// [`sort`](Self::sort) with the state loaded from and saved back to
    /// the session before returning.
    ///
    /// # Errors
    ///
    /// Returns `SortStateError::Corrupt` if the session holds an unreadable
    /// sort state. Nothing is sorted or saved in that case.
    pub fn sort_persisted(
        records: &mut [RawRecord],
        requested: Option<Column>,
        session: &mut impl SessionStore,
    ) -> Result<SortState, SortStateError> {
        let current = SortState::load(session)?;
        let state = Self::sort(records, requested, current);
        state.save(session);
        Ok(state)
    }
}

/// Locale-style string order: letters compare case-insensitively first,
/// then lowercase before uppercase, then by code point.
#[must_use]
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let folded = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<_>>();

    folded(a)
        .cmp(&folded(b))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}
