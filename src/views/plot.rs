use serde::Serialize;
use std::collections::HashSet;
use utoipa::ToSchema;

use crate::analysis::projector::{AxisLabel, GridAxis, GridWeight, DEFAULT_PADDING};
use crate::analysis::{
    ColorTable, GridLine, LineParser, PlotDomain, RawRecord, SeriesBuckets, SeriesProjector,
    SeriesSelector, TimeAxis,
};

/// Canvas size and padding for one plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotOptions {
    pub width: f64,
    pub height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 480.0,
            padding_x: DEFAULT_PADDING,
            padding_y: DEFAULT_PADDING,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Grid line with its pixel end points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct GridSegment {
    pub axis: GridAxis,
    pub position: f64,
    pub weight: GridWeight,
    pub line_width: u8,
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PlacedLabel {
    pub axis: GridAxis,
    pub text: String,
    pub font_px: f64,
    pub at: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LegendEntry {
    pub key: String,
    pub color: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SeriesPoints {
    pub key: String,
    pub color: String,
    pub points: Vec<Point>,
}

/// Everything a canvas needs to draw a day or week plot.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlotView {
    pub axis: TimeAxis,
    pub domain: PlotDomain,
    pub grid: Vec<GridSegment>,
    pub labels: Vec<PlacedLabel>,
    pub legend: Vec<LegendEntry>,
    /// Visible series only.
    pub series: Vec<SeriesPoints>,
}

impl PlotView {
    /// Parses the batch for `axis`, hides the `hidden` keys and lays out the
    /// plot. Keys not in the batch are ignored.
    #[must_use]
    pub fn build(
        records: &[RawRecord],
        axis: TimeAxis,
        hidden: &[&str],
        options: PlotOptions,
    ) -> Self {
        let parsed = LineParser::new(axis).parse_batch(records);
        let buckets = SeriesBuckets::from_records(&parsed);
        let colors = ColorTable::assign(buckets.keys());

        let mut selector = SeriesSelector::new(buckets.keys());
        let hidden: HashSet<&str> = hidden.iter().copied().collect();
        for key in hidden {
            selector.toggle(key);
        }

        Self::render(axis, &buckets, &selector, &colors, options)
    }

    /// Lays out the plot for the current selection. Called again after every
    /// legend toggle so the domain only reflects visible series.
    #[must_use]
    pub fn render(
        axis: TimeAxis,
        buckets: &SeriesBuckets,
        selector: &SeriesSelector,
        colors: &ColorTable,
        options: PlotOptions,
    ) -> Self {
        let projector = SeriesProjector::new(axis).with_padding(options.padding_x, options.padding_y);
        let visible = selector.visible_keys();
        let domain = projector.compute_domain(buckets, &visible, options.width, options.height);

        let grid = projector
            .grid_lines(&domain)
            .into_iter()
            .map(|line| segment(&domain, line))
            .collect();

        let labels = projector
            .axis_labels(&domain)
            .into_iter()
            .map(|label| place(&domain, label))
            .collect();

        let color_of = |key: &str| colors.color_for(key).unwrap_or_default().to_string();

        let legend = selector
            .keys()
            .map(|key| LegendEntry {
                key: key.to_string(),
                color: color_of(key),
                visible: selector.is_visible(key),
            })
            .collect();

        let series = visible
            .iter()
            .filter_map(|key| buckets.get(key))
            .map(|series| SeriesPoints {
                key: series.key.clone(),
                color: color_of(&series.key),
                points: series
                    .points
                    .iter()
                    .map(|&(time, value)| Point::from(projector.project(&domain, time, value)))
                    .collect(),
            })
            .collect();

        Self {
            axis,
            domain,
            grid,
            labels,
            legend,
            series,
        }
    }
}

fn segment(domain: &PlotDomain, line: GridLine) -> GridSegment {
    let (from, to) = match line.axis {
        GridAxis::Time => (
            domain.project(line.position, domain.y_min),
            domain.project(line.position, domain.y_max),
        ),
        GridAxis::Value => (
            domain.project(domain.x_min, line.position),
            domain.project(domain.x_max, line.position),
        ),
    };

    GridSegment {
        axis: line.axis,
        position: line.position,
        weight: line.weight,
        line_width: line.weight.line_width(),
        from: from.into(),
        to: to.into(),
    }
}

/// Value labels sit on the left edge, time labels just below the bottom
/// grid line.
fn place(domain: &PlotDomain, label: AxisLabel) -> PlacedLabel {
    let at = match label.axis {
        GridAxis::Value => domain.project(domain.x_min, label.position),
        GridAxis::Time => {
            let (x, y) = domain.project(label.position, domain.y_min);
            (x, y + 0.5)
        }
    };

    PlacedLabel {
        axis: label.axis,
        text: label.text,
        font_px: label.font_px,
        at: at.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> Vec<RawRecord> {
        vec![
            RawRecord::new("01:00:00", "low", "10"),
            RawRecord::new("02:00:00", "mid", "20"),
            RawRecord::new("03:00:00", "high", "30"),
            RawRecord::new("04:00:00", "note", "rebooted"),
        ]
    }

    #[test]
    fn hiding_a_series_rescales_and_keeps_colors() {
        let all = PlotView::build(&batch(), TimeAxis::Day, &[], PlotOptions::default());
        assert_eq!((all.domain.y_min, all.domain.y_max), (8.0, 31.0));
        assert_eq!(all.series.len(), 4);

        let hidden = PlotView::build(&batch(), TimeAxis::Day, &["high"], PlotOptions::default());
        assert_eq!((hidden.domain.y_min, hidden.domain.y_max), (8.0, 21.0));
        assert_eq!(hidden.series.len(), 3);
        assert!(hidden.series.iter().all(|s| s.key != "high"));

        let high = hidden.legend.iter().find(|e| e.key == "high").unwrap();
        assert!(!high.visible);
        assert_eq!(all.legend, {
            let mut legend = hidden.legend.clone();
            for entry in &mut legend {
                entry.visible = true;
            }
            legend
        });
    }

    #[test]
    fn points_land_inside_the_padded_canvas() {
        let view = PlotView::build(&batch(), TimeAxis::Day, &[], PlotOptions::default());
        for series in &view.series {
            for point in &series.points {
                assert!(point.x >= 10.0 && point.x <= 790.0);
                assert!(point.y >= 10.0 && point.y <= 470.0);
            }
        }
    }

    #[test]
    fn grid_segments_span_the_domain() {
        let view = PlotView::build(&batch(), TimeAxis::Week, &[], PlotOptions::default());
        let first = view.grid.first().unwrap();
        assert_eq!(first.axis, GridAxis::Time);
        assert_eq!(first.from, Point { x: 10.0, y: 470.0 });
        assert_eq!(first.to, Point { x: 10.0, y: 10.0 });
        assert!(view.grid.iter().any(|s| s.line_width == 4));
    }
}
