//! Widget-independent dashboard logic.
//!
//! A raw batch is parsed once by [`LineParser`] and then fed to exactly one
//! consumer per view: [`StatAggregator`] for the statistics summary,
//! [`SeriesSelector`] and [`SeriesProjector`] for the day and week plots, or
//! [`TableSorter`] for the raw table. Everything here is synchronous and
//! builds fresh state per view.

pub mod parser;
pub mod projector;
pub mod record;
pub mod selector;
pub mod sorter;
pub mod stats;

pub use parser::LineParser;
pub use projector::{ColorTable, GridLine, PlotDomain, SeriesBuckets, SeriesProjector};
pub use record::{ParsedRecord, RawRecord, TimeAxis};
pub use selector::SeriesSelector;
pub use sorter::{Column, Direction, MemorySession, SessionStore, SortState, SortStateError, TableSorter};
pub use stats::{RunningStat, StatAggregator};
