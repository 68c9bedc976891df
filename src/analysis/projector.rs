//! Plot geometry: value ranges, pixel projection, grid ticks and colors.
//!
//! The projector never draws. It hands a [`PlotDomain`], [`GridLine`]s,
//! [`AxisLabel`]s and a [`ColorTable`] to whatever renders the canvas.

use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use super::record::{ParsedRecord, TimeAxis};

/// Series colors, cycled in first-seen key order.
pub const PALETTE: [&str; 9] = [
    "#c20000", "#3564B1", "#7e00c2", "#007031", "#B33E00", "#5D7000", "#1700c2", "#006f9e",
    "#c20067",
];

pub const DEFAULT_PADDING: f64 = 10.0;

/// Headroom added above the largest and below the smallest visible value.
const Y_HEADROOM_ABOVE: f64 = 1.0;
const Y_HEADROOM_BELOW: f64 = 2.0;

/// `Math.round` semantics: halves go toward positive infinity.
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Readings grouped by source key, keys in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct SeriesBuckets {
    series: Vec<Series>,
    index: HashMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub key: String,
    /// `(time, value)` pairs in batch order.
    pub points: Vec<(f64, f64)>,
}

impl SeriesBuckets {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ParsedRecord>) -> Self {
        let mut buckets = Self::default();
        for record in records {
            buckets.push(record);
        }
        buckets
    }

    /// A key gets a bucket on first sight even if its record has no readings.
    pub fn push(&mut self, record: &ParsedRecord) {
        let slot = match self.index.get(&record.source) {
            Some(&slot) => slot,
            None => {
                self.series.push(Series {
                    key: record.source.clone(),
                    points: Vec::new(),
                });
                let slot = self.series.len() - 1;
                self.index.insert(record.source.clone(), slot);
                slot
            }
        };
        self.series[slot]
            .points
            .extend(record.readings.iter().map(|&value| (record.time, value)));
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Series> {
        self.index.get(key).map(|&slot| &self.series[slot])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }
}

/// Mapping from data space to canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct PlotDomain {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub width: f64,
    pub height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl PlotDomain {
    #[must_use]
    pub fn new(
        (x_min, x_max): (f64, f64),
        (y_min, y_max): (f64, f64),
        (width, height): (f64, f64),
        (padding_x, padding_y): (f64, f64),
    ) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            width,
            height,
            padding_x,
            padding_y,
            scale_x: (width - 2.0 * padding_x) / (x_max - x_min),
            scale_y: (height - 2.0 * padding_y) / (y_max - y_min),
        }
    }

    /// Pixel position of a point. Y is inverted so larger values sit higher.
    #[must_use]
    pub fn project(&self, time: f64, value: f64) -> (f64, f64) {
        (
            self.padding_x + (time - self.x_min) * self.scale_x,
            self.padding_y + (self.y_max - value) * self.scale_y,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GridAxis {
    /// Vertical line at a time position.
    Time,
    /// Horizontal line at a value position.
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GridWeight {
    Light,
    Medium,
    Heavy,
}

impl GridWeight {
    #[must_use]
    pub const fn line_width(self) -> u8 {
        match self {
            Self::Light => 1,
            Self::Medium => 2,
            Self::Heavy => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct GridLine {
    pub axis: GridAxis,
    pub position: f64,
    pub weight: GridWeight,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AxisLabel {
    pub axis: GridAxis,
    pub position: f64,
    pub text: String,
    pub font_px: f64,
}

/// Vertical tick spacing per weight and label spacing for one time axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSchedule {
    pub light: f64,
    pub medium: f64,
    pub heavy: f64,
    pub label: f64,
    /// Whether labels are also placed on the domain edges.
    pub label_edges: bool,
}

impl TickSchedule {
    #[must_use]
    pub const fn for_axis(axis: TimeAxis) -> Self {
        match axis {
            TimeAxis::Day => Self {
                light: 1.0,
                medium: 2.0,
                heavy: 4.0,
                label: 4.0,
                label_edges: false,
            },
            TimeAxis::Week => Self {
                light: 0.25,
                medium: 0.5,
                heavy: 1.0,
                label: 1.0,
                label_edges: true,
            },
        }
    }
}

/// Positions `from, from + step, ...` up to and including `to`.
fn steps(from: f64, to: f64, step: f64) -> impl Iterator<Item = f64> {
    let count = ((to - from) / step).round().max(0.0) as usize;
    (0..=count).map(move |i| from + i as f64 * step)
}

/// Upper bound on horizontal grid lines (and value labels) per plot.
pub const MAX_VALUE_LINES: f64 = 200.0;

/// Spacing of the horizontal grid: one line per integer while the span
/// allows it, otherwise the smallest 1, 2 or 5 x 10^k step that keeps the
/// line count within [`MAX_VALUE_LINES`].
#[must_use]
pub fn value_step(span: f64) -> f64 {
    if !span.is_finite() || span <= MAX_VALUE_LINES {
        return 1.0;
    }
    let raw = span / MAX_VALUE_LINES;
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    [1.0, 2.0, 5.0]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|&step| step >= raw)
        .unwrap_or(10.0 * magnitude)
}

/// Multiples of the value step inside the Y domain.
fn value_positions(domain: &PlotDomain) -> impl Iterator<Item = f64> {
    let span = domain.y_max - domain.y_min;
    let step = value_step(span);
    let first = (domain.y_min / step).ceil();
    let last = (domain.y_max / step).floor();
    let count = if span.is_finite() && last >= first {
        (last - first) as usize + 1
    } else {
        0
    };
    // `+ 0.0` turns a `-0` first line into `0`
    (0..count).map(move |i| (first + i as f64) * step + 0.0)
}

#[derive(Debug, Clone, Copy)]
pub struct SeriesProjector {
    axis: TimeAxis,
    padding_x: f64,
    padding_y: f64,
}

impl SeriesProjector {
    #[must_use]
    pub const fn new(axis: TimeAxis) -> Self {
        Self {
            axis,
            padding_x: DEFAULT_PADDING,
            padding_y: DEFAULT_PADDING,
        }
    }

    #[must_use]
    pub const fn with_padding(mut self, padding_x: f64, padding_y: f64) -> Self {
        self.padding_x = padding_x;
        self.padding_y = padding_y;
        self
    }

    #[must_use]
    pub const fn axis(&self) -> TimeAxis {
        self.axis
    }

    /// Domain for the current canvas. Only readings of `visible_keys` shape
    /// the value range; with nothing visible the range falls back to `[0, 1]`.
    #[must_use]
    pub fn compute_domain(
        &self,
        buckets: &SeriesBuckets,
        visible_keys: &[&str],
        width: f64,
        height: f64,
    ) -> PlotDomain {
        let (min, max) = visible_keys
            .iter()
            .filter_map(|key| buckets.get(key))
            .flat_map(|series| series.points.iter().map(|&(_, value)| value))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        let y_range = if min.is_finite() && max.is_finite() {
            (
                round_half_up(min - Y_HEADROOM_BELOW),
                round_half_up(max + Y_HEADROOM_ABOVE),
            )
        } else {
            (0.0, 1.0)
        };

        PlotDomain::new(
            self.axis.x_range(),
            y_range,
            (width, height),
            (self.padding_x, self.padding_y),
        )
    }

    #[must_use]
    pub fn project(&self, domain: &PlotDomain, time: f64, value: f64) -> (f64, f64) {
        domain.project(time, value)
    }

    /// Grid in drawing order: light verticals and the horizontals first, then medium and heavy verticals on top.
    #[must_use]
    pub fn grid_lines(&self, domain: &PlotDomain) -> Vec<GridLine> {
        let schedule = TickSchedule::for_axis(self.axis);
        let vertical = |step: f64, weight: GridWeight| {
            steps(domain.x_min, domain.x_max, step).map(move |position| GridLine {
                axis: GridAxis::Time,
                position,
                weight,
            })
        };

        let mut lines: Vec<GridLine> = vertical(schedule.light, GridWeight::Light).collect();
        lines.extend(
            value_positions(domain).map(|position| GridLine {
                axis: GridAxis::Value,
                position,
                weight: GridWeight::Light,
            }),
        );
        lines.extend(vertical(schedule.medium, GridWeight::Medium));
        lines.extend(vertical(schedule.heavy, GridWeight::Heavy));
        lines
    }

    /// One value label per horizontal grid line at the left edge, time
    /// labels along the bottom edge.
    #[must_use]
    pub fn axis_labels(&self, domain: &PlotDomain) -> Vec<AxisLabel> {
        let schedule = TickSchedule::for_axis(self.axis);

        let font_px = domain.scale_y * value_step(domain.y_max - domain.y_min) / 2.0;
        let mut labels: Vec<AxisLabel> = value_positions(domain)
            .map(|position| AxisLabel {
                axis: GridAxis::Value,
                position,
                text: format!("{position:.0}"),
                font_px,
            })
            .collect();

        labels.extend(
            steps(domain.x_min, domain.x_max, schedule.label)
                .filter(|&t| schedule.label_edges || (t > domain.x_min && t < domain.x_max))
                .map(|position| AxisLabel {
                    axis: GridAxis::Time,
                    position,
                    text: format!("{position:.0}"),
                    font_px: domain.scale_x,
                }),
        );
        labels
    }
}

/// Fixed color per key, assigned once per view so toggling a series never
/// recolors the others.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    entries: Vec<(String, &'static str)>,
    index: HashMap<String, usize>,
}

impl ColorTable {
    pub fn assign<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut table = Self::default();
        for key in keys {
            if table.index.contains_key(key) {
                continue;
            }
            let color = PALETTE[table.entries.len() % PALETTE.len()];
            table.index.insert(key.to_string(), table.entries.len());
            table.entries.push((key.to_string(), color));
        }
        table
    }

    #[must_use]
    pub fn color_for(&self, key: &str) -> Option<&'static str> {
        self.index.get(key).map(|&slot| self.entries[slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.entries.iter().map(|(key, color)| (key.as_str(), *color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: &str, time: f64, readings: &[f64]) -> ParsedRecord {
        ParsedRecord {
            time,
            source: source.to_string(),
            readings: readings.to_vec(),
        }
    }

    fn buckets() -> SeriesBuckets {
        SeriesBuckets::from_records(&[
            record("a", 1.0, &[10.0]),
            record("b", 2.0, &[20.0]),
            record("c", 3.0, &[30.0]),
        ])
    }

    #[test]
    fn value_range_pads_below_more_than_above() {
        let domain = SeriesProjector::new(TimeAxis::Day).compute_domain(
            &buckets(),
            &["a", "b", "c"],
            500.0,
            300.0,
        );

        assert_eq!(domain.y_min, 8.0);
        assert_eq!(domain.y_max, 31.0);
        assert_eq!((domain.x_min, domain.x_max), (0.0, 24.0));
        assert!((domain.scale_x - 480.0 / 24.0).abs() < 1e-12);
        assert!((domain.scale_y - 280.0 / 23.0).abs() < 1e-12);
    }

    #[test]
    fn hidden_series_do_not_shape_the_range() {
        let domain = SeriesProjector::new(TimeAxis::Day).compute_domain(
            &buckets(),
            &["a", "b"],
            500.0,
            300.0,
        );
        assert_eq!(domain.y_max, 21.0);
        assert_eq!(domain.y_min, 8.0);
    }

    #[test]
    fn rounding_goes_half_up() {
        let buckets = SeriesBuckets::from_records(&[record("a", 0.0, &[-0.5, 1.5])]);
        let domain =
            SeriesProjector::new(TimeAxis::Day).compute_domain(&buckets, &["a"], 100.0, 100.0);
        // -2.5 rounds to -2, 2.5 rounds to 3
        assert_eq!(domain.y_min, -2.0);
        assert_eq!(domain.y_max, 3.0);
    }

    #[test]
    fn nothing_visible_falls_back_to_unit_range() {
        let domain =
            SeriesProjector::new(TimeAxis::Week).compute_domain(&buckets(), &[], 100.0, 100.0);
        assert_eq!((domain.y_min, domain.y_max), (0.0, 1.0));
        assert_eq!((domain.x_min, domain.x_max), (0.0, 7.0));
        assert!(domain.scale_y.is_finite());
    }

    #[test]
    fn projection_inverts_y() {
        let projector = SeriesProjector::new(TimeAxis::Day);
        let domain = projector.compute_domain(&buckets(), &["a", "b", "c"], 500.0, 300.0);

        let (x0, top) = projector.project(&domain, 0.0, domain.y_max);
        assert_eq!((x0, top), (10.0, 10.0));

        let (x_end, bottom) = projector.project(&domain, 24.0, domain.y_min);
        assert!((x_end - 490.0).abs() < 1e-9);
        assert!((bottom - 290.0).abs() < 1e-9);

        let (_, low) = projector.project(&domain, 1.0, 10.0);
        let (_, high) = projector.project(&domain, 1.0, 30.0);
        assert!(high < low);
    }

    #[test]
    fn day_grid_has_three_densities() {
        let projector = SeriesProjector::new(TimeAxis::Day);
        let domain = PlotDomain::new((0.0, 24.0), (0.0, 3.0), (500.0, 300.0), (10.0, 10.0));
        let lines = projector.grid_lines(&domain);

        let count = |axis, weight| {
            lines
                .iter()
                .filter(|l| l.axis == axis && l.weight == weight)
                .count()
        };
        assert_eq!(count(GridAxis::Time, GridWeight::Light), 25);
        assert_eq!(count(GridAxis::Time, GridWeight::Medium), 13);
        assert_eq!(count(GridAxis::Time, GridWeight::Heavy), 7);
        assert_eq!(count(GridAxis::Value, GridWeight::Light), 4);
        assert_eq!(lines.first().map(|l| l.weight), Some(GridWeight::Light));
        assert_eq!(lines.last().map(|l| l.weight), Some(GridWeight::Heavy));
    }

    #[test]
    fn week_grid_uses_fractional_days() {
        let projector = SeriesProjector::new(TimeAxis::Week);
        let domain = PlotDomain::new((0.0, 7.0), (0.0, 1.0), (500.0, 300.0), (10.0, 10.0));
        let lines = projector.grid_lines(&domain);

        let light: Vec<f64> = lines
            .iter()
            .filter(|l| l.axis == GridAxis::Time && l.weight == GridWeight::Light)
            .map(|l| l.position)
            .collect();
        assert_eq!(light.len(), 29);
        assert_eq!(light[1], 0.25);
        assert_eq!(light[28], 7.0);

        let heavy = lines
            .iter()
            .filter(|l| l.weight == GridWeight::Heavy)
            .count();
        assert_eq!(heavy, 8);
    }

    #[test]
    fn time_labels_follow_the_axis() {
        let day = SeriesProjector::new(TimeAxis::Day);
        let domain = PlotDomain::new((0.0, 24.0), (0.0, 2.0), (500.0, 300.0), (10.0, 10.0));
        let times: Vec<String> = day
            .axis_labels(&domain)
            .into_iter()
            .filter(|l| l.axis == GridAxis::Time)
            .map(|l| l.text)
            .collect();
        assert_eq!(times, vec!["4", "8", "12", "16", "20"]);

        let week = SeriesProjector::new(TimeAxis::Week);
        let domain = PlotDomain::new((0.0, 7.0), (0.0, 2.0), (500.0, 300.0), (10.0, 10.0));
        let labels = week.axis_labels(&domain);
        assert_eq!(labels.iter().filter(|l| l.axis == GridAxis::Time).count(), 8);
        assert_eq!(labels.iter().filter(|l| l.axis == GridAxis::Value).count(), 3);
    }

    #[test]
    fn value_step_widens_past_the_line_limit() {
        assert_eq!(value_step(23.0), 1.0);
        assert_eq!(value_step(200.0), 1.0);
        assert_eq!(value_step(201.0), 2.0);
        assert_eq!(value_step(1_000.0), 5.0);
        assert_eq!(value_step(2_500.0), 20.0);
        assert_eq!(value_step(50_000_003.0), 500_000.0);
    }

    #[test]
    fn huge_readings_keep_the_grid_bounded() {
        let projector = SeriesProjector::new(TimeAxis::Day);
        let buckets = SeriesBuckets::from_records(&[record("kWh", 1.0, &[0.0, 1e9])]);
        let domain = projector.compute_domain(&buckets, &["kWh"], 500.0, 300.0);
        assert_eq!((domain.y_min, domain.y_max), (-2.0, 1_000_000_001.0));

        let lines = projector.grid_lines(&domain);
        let values: Vec<f64> = lines
            .iter()
            .filter(|l| l.axis == GridAxis::Value)
            .map(|l| l.position)
            .collect();
        assert!(values.len() <= MAX_VALUE_LINES as usize + 1);
        assert_eq!(values.first(), Some(&0.0));
        assert_eq!(values.last(), Some(&1e9));
        assert!(lines.len() <= MAX_VALUE_LINES as usize + 1 + 25 + 13 + 7);

        let labels = projector.axis_labels(&domain);
        let value_labels = labels.iter().filter(|l| l.axis == GridAxis::Value).count();
        assert_eq!(value_labels, values.len());
    }

    #[test]
    fn colors_cycle_in_first_seen_order() {
        let keys: Vec<String> = (0..11).map(|i| format!("k{i}")).collect();
        let table = ColorTable::assign(keys.iter().map(String::as_str));

        assert_eq!(table.color_for("k0"), Some(PALETTE[0]));
        assert_eq!(table.color_for("k8"), Some(PALETTE[8]));
        assert_eq!(table.color_for("k9"), Some(PALETTE[0]));
        assert_eq!(table.color_for("missing"), None);
    }

    #[test]
    fn buckets_keep_keys_without_readings() {
        let buckets = SeriesBuckets::from_records(&[
            record("door", 1.0, &[]),
            record("temp", 2.0, &[70.0, 71.0]),
        ]);
        assert_eq!(buckets.keys().collect::<Vec<_>>(), vec!["door", "temp"]);
        assert!(buckets.get("door").unwrap().points.is_empty());
        assert_eq!(
            buckets.get("temp").unwrap().points,
            vec![(2.0, 70.0), (2.0, 71.0)]
        );
    }
}
