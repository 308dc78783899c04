//! Pure chart projection: maps a chronological series of plot points onto a
//! pixel coordinate system. Produces geometry only (axes, polyline, tick
//! labels); drawing is the caller's concern.

use crate::types::measurement::PlotPoint;

/// Roughly how many x-axis labels a chart should carry regardless of series
/// length.
const TARGET_LABEL_COUNT: usize = 10;

/// A point in pixel space. Origin is top-left, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

/// A straight segment in pixel space, used for the two axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: PixelPoint,
    pub to: PixelPoint,
}

/// An x-axis tick label: pixel position plus the day and time fragments of the
/// source timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct TickLabel {
    pub x: f64,
    /// "MM-DD" slice of the timestamp, empty if the timestamp is too short.
    pub day: String,
    /// "hh:mm" slice of the timestamp, empty if the timestamp is too short.
    pub time: String,
}

/// The computed geometry of one chart.
///
/// Axes are always present. `polyline` is empty for fewer than two points
/// (a single sample has no line segment to draw). `value_range` is `None`
/// for an empty series; renderers show a placeholder message instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub y_axis: Segment,
    pub x_axis: Segment,
    pub polyline: Vec<PixelPoint>,
    pub labels: Vec<TickLabel>,
    pub value_range: Option<(f64, f64)>,
}

impl ChartLayout {
    pub fn has_data(&self) -> bool {
        self.value_range.is_some()
    }
}

/// Projects `series` onto a `width` x `height` canvas with a uniform margin.
///
/// x(i) = margin + i * plotWidth / (n - 1); y(v) scales linearly between the
/// series minimum (bottom) and maximum (top). A constant series renders as a
/// flat line at mid-height rather than dividing by zero. Labels are thinned to
/// every max(1, n / 10)-th point.
pub fn project(series: &[PlotPoint], width: f64, height: f64, margin: f64) -> ChartLayout {
    let y_axis = Segment {
        from: PixelPoint { x: margin, y: margin },
        to: PixelPoint {
            x: margin,
            y: height - margin,
        },
    };
    let x_axis = Segment {
        from: PixelPoint {
            x: margin,
            y: height - margin,
        },
        to: PixelPoint {
            x: width - margin,
            y: height - margin,
        },
    };

    if series.is_empty() {
        return ChartLayout {
            y_axis,
            x_axis,
            polyline: Vec::new(),
            labels: Vec::new(),
            value_range: None,
        };
    }

    let n = series.len();
    let plot_width = width - 2.0 * margin;
    let plot_height = height - 2.0 * margin;

    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for point in series {
        min_y = min_y.min(point.value);
        max_y = max_y.max(point.value);
    }

    let x_at = |i: usize| {
        if n < 2 {
            margin
        } else {
            margin + i as f64 * (plot_width / (n - 1) as f64)
        }
    };
    let y_at = |value: f64| {
        // Constant series: flat line at mid-height.
        let normalized = if max_y == min_y {
            0.5
        } else {
            (value - min_y) / (max_y - min_y)
        };
        height - margin - normalized * plot_height
    };

    let polyline = if n < 2 {
        Vec::new()
    } else {
        series
            .iter()
            .enumerate()
            .map(|(i, point)| PixelPoint {
                x: x_at(i),
                y: y_at(point.value),
            })
            .collect()
    };

    let step = (n / TARGET_LABEL_COUNT).max(1);
    let labels = series
        .iter()
        .enumerate()
        .step_by(step)
        .map(|(i, point)| TickLabel {
            x: x_at(i),
            day: slice_of(&point.timestamp, 5, 10),
            time: slice_of(&point.timestamp, 11, 16),
        })
        .collect();

    ChartLayout {
        y_axis,
        x_axis,
        polyline,
        labels,
        value_range: Some((min_y, max_y)),
    }
}

/// Fixed-width byte slice of a timestamp, empty when out of range. Timestamps
/// follow the source's "YYYY-MM-DD hh:mm:ss" convention, all ASCII.
fn slice_of(timestamp: &str, start: usize, end: usize) -> String {
    timestamp.get(start..end).unwrap_or_default().to_string()
}
