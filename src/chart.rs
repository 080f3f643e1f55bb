//! Chart geometry pipeline and panel state machine
//!
//! Pure layout math: a forecast window plus a drawing area in, point and
//! segment geometry out. Nothing here draws; renderers consume the geometry.

use thiserror::Error;

use crate::models::ForecastDay;

/// Inner padding on every side of the drawing area, in pixels
pub const PADDING: f64 = 20.0;

/// Pressure values are charted relative to this base so the axis range stays
/// readable; display labels add it back
pub const PRESSURE_BASE: f64 = 1000.0;

#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("No forecast days to chart")]
    EmptySeries,

    #[error("Forecast day {day} has no {metric} value")]
    MissingMetric { metric: &'static str, day: String },

    #[error("Drawing area too small to chart")]
    ZeroArea,
}

/// Which forecast quantity the chart plots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartMetric {
    #[default]
    Temperature,
    Humidity,
    Pressure,
}

impl ChartMetric {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Pressure => "pressure",
        }
    }

    /// Raw chart value for one day. Pressure is offset by [`PRESSURE_BASE`];
    /// a day without the metric is an error, never a fabricated zero.
    fn extract(&self, day: &ForecastDay) -> Result<f64, ChartError> {
        match self {
            Self::Temperature => Ok(day.temp_avg),
            Self::Humidity => day.humidity.ok_or_else(|| ChartError::MissingMetric {
                metric: self.label(),
                day: day.day.clone(),
            }),
            Self::Pressure => Ok(day.pressure - PRESSURE_BASE),
        }
    }

    /// Display label for a raw chart value
    #[must_use]
    pub fn format_value(&self, value: f64) -> String {
        match self {
            Self::Temperature => format!("{}°", value.round()),
            Self::Humidity => format!("{}%", value.round()),
            Self::Pressure => format!("{} hPa", (value + PRESSURE_BASE).round()),
        }
    }
}

/// Drawing area in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartArea {
    pub width: f64,
    pub height: f64,
}

impl ChartArea {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// One plotted point with its display labels
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    /// Day label from the forecast window ("Today")
    pub day: String,
    /// Raw chart value this point encodes
    pub value: f64,
    /// Display label for the value ("21°")
    pub label: String,
}

/// One straight segment between consecutive points, expressed as an origin
/// plus length and rotation so renderers can place rotated elements
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSegment {
    pub x: f64,
    pub y: f64,
    pub length: f64,
    pub angle_deg: f64,
}

/// Complete layout for one metric over one window
#[derive(Debug, Clone, PartialEq)]
pub struct ChartGeometry {
    pub metric: ChartMetric,
    pub area: ChartArea,
    pub points: Vec<ChartPoint>,
    pub segments: Vec<ChartSegment>,
    /// Value mapped to the bottom edge of the drawing region
    pub scaled_min: f64,
    /// Value mapped to the top edge of the drawing region
    pub scaled_max: f64,
}

/// Lay out one metric of a forecast window inside a drawing area.
///
/// Values are padded with a 10% margin on each side of their range (a fixed
/// margin of 1 when all values are equal) so the line never touches the
/// edges. The y axis is inverted: larger values sit higher.
pub fn layout_series(
    days: &[ForecastDay],
    metric: ChartMetric,
    area: ChartArea,
) -> Result<ChartGeometry, ChartError> {
    if days.is_empty() {
        return Err(ChartError::EmptySeries);
    }

    let draw_width = area.width - 2.0 * PADDING;
    let draw_height = area.height - 2.0 * PADDING;
    if draw_width <= 0.0 || draw_height <= 0.0 {
        return Err(ChartError::ZeroArea);
    }

    let values = days
        .iter()
        .map(|day| metric.extract(day))
        .collect::<Result<Vec<_>, _>>()?;

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let margin = if max > min { (max - min) * 0.1 } else { 1.0 };
    let scaled_min = min - margin;
    let scaled_max = max + margin;
    let range = scaled_max - scaled_min;

    let points: Vec<ChartPoint> = values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let fraction = if days.len() > 1 {
                i as f64 / (days.len() - 1) as f64
            } else {
                0.0
            };
            ChartPoint {
                x: PADDING + fraction * draw_width,
                y: PADDING + draw_height - ((value - scaled_min) / range) * draw_height,
                day: days[i].day.clone(),
                value,
                label: metric.format_value(value),
            }
        })
        .collect();

    let segments = points
        .windows(2)
        .map(|pair| {
            let dx = pair[1].x - pair[0].x;
            let dy = pair[1].y - pair[0].y;
            ChartSegment {
                x: pair[0].x,
                y: pair[0].y,
                length: (dx * dx + dy * dy).sqrt(),
                angle_deg: dy.atan2(dx).to_degrees(),
            }
        })
        .collect();

    Ok(ChartGeometry {
        metric,
        area,
        points,
        segments,
        scaled_min,
        scaled_max,
    })
}

/// A rendered chart: the window it was built from plus its geometry
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub days: Vec<ForecastDay>,
    pub geometry: ChartGeometry,
}

/// Lifecycle state of the chart panel
#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    /// Nothing loaded yet
    Empty,
    /// First load in flight
    Loading,
    /// Geometry available
    Rendered(RenderedChart),
    /// New load in flight while the previous render stays visible
    Refreshing { previous: RenderedChart },
    /// Last load or layout failed
    Failed { message: String },
}

/// Chart panel state machine.
///
/// The selected metric survives state transitions; a refresh failure keeps
/// the previous render on screen rather than blanking the panel.
#[derive(Debug)]
pub struct ChartPanel {
    metric: ChartMetric,
    state: PanelState,
}

impl Default for ChartPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartPanel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            metric: ChartMetric::default(),
            state: PanelState::Empty,
        }
    }

    #[must_use]
    pub fn state(&self) -> &PanelState {
        &self.state
    }

    #[must_use]
    pub fn metric(&self) -> ChartMetric {
        self.metric
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(
            self.state,
            PanelState::Loading | PanelState::Refreshing { .. }
        )
    }

    /// Currently visible geometry, if any. A refreshing panel still shows
    /// its previous render.
    #[must_use]
    pub fn geometry(&self) -> Option<&ChartGeometry> {
        match &self.state {
            PanelState::Rendered(chart) => Some(&chart.geometry),
            PanelState::Refreshing { previous } => Some(&previous.geometry),
            _ => None,
        }
    }

    /// Mark a load as started
    pub fn begin_load(&mut self) {
        self.state = match std::mem::replace(&mut self.state, PanelState::Empty) {
            PanelState::Rendered(chart) => PanelState::Refreshing { previous: chart },
            PanelState::Refreshing { previous } => PanelState::Refreshing { previous },
            _ => PanelState::Loading,
        };
    }

    /// Complete a load with a fresh window, laying it out in `area`
    pub fn complete_load(
        &mut self,
        days: Vec<ForecastDay>,
        area: ChartArea,
    ) -> Result<(), ChartError> {
        match layout_series(&days, self.metric, area) {
            Ok(geometry) => {
                self.state = PanelState::Rendered(RenderedChart { days, geometry });
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Record a load failure
    pub fn fail_load(&mut self, message: impl Into<String>) {
        self.state = PanelState::Failed {
            message: message.into(),
        };
    }

    /// Switch the plotted metric, relaying out the current window
    pub fn switch_metric(&mut self, metric: ChartMetric) -> Result<(), ChartError> {
        self.metric = metric;
        self.relayout(None)
    }

    /// Recompute geometry for a new drawing area, keeping the window
    pub fn redraw(&mut self, area: ChartArea) -> Result<(), ChartError> {
        self.relayout(Some(area))
    }

    fn relayout(&mut self, new_area: Option<ChartArea>) -> Result<(), ChartError> {
        let chart = match &self.state {
            PanelState::Rendered(chart) => chart,
            PanelState::Refreshing { previous } => previous,
            _ => return Ok(()),
        };

        let area = new_area.unwrap_or(chart.geometry.area);
        match layout_series(&chart.days, self.metric, area) {
            Ok(geometry) => {
                let days = chart.days.clone();
                self.state = PanelState::Rendered(RenderedChart { days, geometry });
                Ok(())
            }
            Err(err) => {
                // Zero-area redraws keep the previous geometry; the caller
                // retries once the layout settles
                if !matches!(err, ChartError::ZeroArea) {
                    self.fail(&err);
                }
                Err(err)
            }
        }
    }

    fn fail(&mut self, err: &ChartError) {
        self.state = PanelState::Failed {
            message: err.to_string(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ForecastCondition;
    use rstest::rstest;

    fn day(label: &str, temp_avg: f64) -> ForecastDay {
        ForecastDay {
            day: label.to_string(),
            day_name: "Mon".to_string(),
            date: "Jul 4".to_string(),
            full_date: "2026-07-04".to_string(),
            temp_min: temp_avg - 5.0,
            temp_max: temp_avg + 5.0,
            temp_avg,
            humidity: Some(50.0),
            pressure: 1010.0,
            weather: ForecastCondition {
                main: "Clear".to_string(),
                icon: "01d".to_string(),
            },
            current: false,
            precip_probability: None,
            wind_speed_ms: None,
            wind_speed_kmh: None,
            wind_direction: None,
            wind_gust_kmh: None,
            uv_index: None,
            precip_amount_mm: None,
        }
    }

    fn window() -> Vec<ForecastDay> {
        vec![day("A", 10.0), day("B", 20.0), day("C", 30.0)]
    }

    const AREA: ChartArea = ChartArea {
        width: 240.0,
        height: 140.0,
    };

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_x_spacing_spans_draw_width() {
        let geometry = layout_series(&window(), ChartMetric::Temperature, AREA).unwrap();
        assert_close(geometry.points[0].x, 20.0);
        assert_close(geometry.points[1].x, 120.0);
        assert_close(geometry.points[2].x, 220.0);
    }

    #[test]
    fn test_y_mapping_inverted_with_margin() {
        // Range 10..30, margin 2, so 8 maps to the bottom and 32 to the top
        // of the 100px drawing region
        let geometry = layout_series(&window(), ChartMetric::Temperature, AREA).unwrap();
        assert_close(geometry.scaled_min, 8.0);
        assert_close(geometry.scaled_max, 32.0);
        assert_close(geometry.points[0].y, 120.0 - (2.0 / 24.0) * 100.0);
        assert_close(geometry.points[1].y, 70.0);
        assert_close(geometry.points[2].y, 120.0 - (22.0 / 24.0) * 100.0);
        // Larger values sit higher on screen
        assert!(geometry.points[2].y < geometry.points[0].y);
    }

    #[test]
    fn test_flat_series_centers_vertically() {
        let days = vec![day("A", 15.0), day("B", 15.0), day("C", 15.0)];
        let geometry = layout_series(&days, ChartMetric::Temperature, AREA).unwrap();
        assert_close(geometry.scaled_min, 14.0);
        assert_close(geometry.scaled_max, 16.0);
        for point in &geometry.points {
            assert_close(point.y, 70.0);
        }
    }

    #[test]
    fn test_segment_length_and_angle() {
        let geometry = layout_series(&window(), ChartMetric::Temperature, AREA).unwrap();
        assert_eq!(geometry.segments.len(), 2);

        let seg = &geometry.segments[0];
        let dx = geometry.points[1].x - geometry.points[0].x;
        let dy = geometry.points[1].y - geometry.points[0].y;
        assert_close(seg.x, geometry.points[0].x);
        assert_close(seg.length, (dx * dx + dy * dy).sqrt());
        assert_close(seg.angle_deg, dy.atan2(dx).to_degrees());
        // Rising values mean a negative (upward) angle
        assert!(seg.angle_deg < 0.0);
    }

    #[test]
    fn test_empty_series_rejected() {
        assert_eq!(
            layout_series(&[], ChartMetric::Temperature, AREA),
            Err(ChartError::EmptySeries)
        );
    }

    #[rstest]
    #[case(40.0, 140.0)]
    #[case(240.0, 40.0)]
    #[case(0.0, 0.0)]
    fn test_zero_area_rejected(#[case] width: f64, #[case] height: f64) {
        assert_eq!(
            layout_series(&window(), ChartMetric::Temperature, ChartArea::new(width, height)),
            Err(ChartError::ZeroArea)
        );
    }

    #[test]
    fn test_missing_humidity_is_an_error() {
        let mut days = window();
        days[1].humidity = None;
        let err = layout_series(&days, ChartMetric::Humidity, AREA).unwrap_err();
        assert!(matches!(err, ChartError::MissingMetric { .. }));
    }

    #[test]
    fn test_pressure_offset_and_label() {
        let geometry = layout_series(&window(), ChartMetric::Pressure, AREA).unwrap();
        // 1010 hPa charts as 10 relative to the base
        assert_close(geometry.points[0].value, 10.0);
        assert_eq!(geometry.points[0].label, "1010 hPa");
    }

    #[test]
    fn test_value_labels() {
        assert_eq!(ChartMetric::Temperature.format_value(21.4), "21°");
        assert_eq!(ChartMetric::Humidity.format_value(54.6), "55%");
        assert_eq!(ChartMetric::Pressure.format_value(4.0), "1004 hPa");
    }

    #[test]
    fn test_panel_first_load_cycle() {
        let mut panel = ChartPanel::new();
        assert_eq!(*panel.state(), PanelState::Empty);

        panel.begin_load();
        assert_eq!(*panel.state(), PanelState::Loading);
        assert!(panel.is_loading());
        assert!(panel.geometry().is_none());

        panel.complete_load(window(), AREA).unwrap();
        assert!(matches!(panel.state(), PanelState::Rendered(_)));
        assert!(panel.geometry().is_some());
    }

    #[test]
    fn test_panel_refresh_keeps_previous_geometry() {
        let mut panel = ChartPanel::new();
        panel.begin_load();
        panel.complete_load(window(), AREA).unwrap();

        panel.begin_load();
        assert!(matches!(panel.state(), PanelState::Refreshing { .. }));
        // Previous render stays visible while refreshing
        assert!(panel.geometry().is_some());

        panel.complete_load(vec![day("A", 5.0), day("B", 6.0)], AREA).unwrap();
        let geometry = panel.geometry().unwrap();
        assert_eq!(geometry.points.len(), 2);
    }

    #[test]
    fn test_panel_metric_switch_relayouts() {
        let mut panel = ChartPanel::new();
        panel.begin_load();
        panel.complete_load(window(), AREA).unwrap();

        panel.switch_metric(ChartMetric::Pressure).unwrap();
        assert_eq!(panel.metric(), ChartMetric::Pressure);
        assert_eq!(panel.geometry().unwrap().metric, ChartMetric::Pressure);
    }

    #[test]
    fn test_panel_metric_survives_failure() {
        let mut panel = ChartPanel::new();
        panel.switch_metric(ChartMetric::Humidity).unwrap();
        panel.begin_load();
        panel.fail_load("network down");
        assert!(matches!(panel.state(), PanelState::Failed { .. }));
        assert_eq!(panel.metric(), ChartMetric::Humidity);
    }

    #[test]
    fn test_panel_zero_area_redraw_keeps_render() {
        let mut panel = ChartPanel::new();
        panel.begin_load();
        panel.complete_load(window(), AREA).unwrap();

        let err = panel.redraw(ChartArea::new(0.0, 0.0)).unwrap_err();
        assert_eq!(err, ChartError::ZeroArea);
        // Render survives so a later redraw can succeed
        assert!(panel.geometry().is_some());

        panel.redraw(ChartArea::new(300.0, 200.0)).unwrap();
        assert_close(panel.geometry().unwrap().area.width, 300.0);
    }

    #[test]
    fn test_panel_single_point_window() {
        let mut panel = ChartPanel::new();
        panel.begin_load();
        panel.complete_load(vec![day("Today", 18.0)], AREA).unwrap();
        let geometry = panel.geometry().unwrap();
        assert_eq!(geometry.points.len(), 1);
        assert!(geometry.segments.is_empty());
        assert_close(geometry.points[0].x, PADDING);
    }
}
