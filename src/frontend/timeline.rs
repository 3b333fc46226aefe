//! Timeline plot rendering with egui_plot
//!
//! Per-task series are drawn as horizontal lanes: one lane per CPU, with
//! unified graphs stacked above the CPU lanes. Only graphs registered in the
//! legend contribute named series, so the egui_plot legend mirrors
//! [`crate::frontend::legend::LegendMembership`] exactly.
//!
//! The active time cursor is placed by clicking the plot; a click near a
//! series also selects that graph.

use egui::{Color32, Ui};
use egui_plot::{Corner, Legend, Line, Plot, PlotBounds, PlotPoints, VLine};

use super::graph::{GraphId, GraphSet};
use crate::config::UiPreferences;
use crate::trace::EventFilter;

/// Maximum lane distance for a click to count as hitting a series
const HIT_TOLERANCE: f64 = 0.5;

/// Result of one render pass
#[derive(Debug, Default)]
pub struct TimelineResponse {
    /// A click inside the plot area, in plot coordinates
    pub clicked: Option<PlotClick>,
}

/// A click on the timeline
#[derive(Debug, Clone, Copy)]
pub struct PlotClick {
    /// Time coordinate of the click
    pub time: f64,
    /// The graph the click landed on, if any
    pub hit: Option<GraphId>,
}

/// Timeline plot configuration and state
#[derive(Debug, Clone)]
pub struct TimelineView {
    /// Whether to show the legend
    pub show_legend: bool,
    /// Whether to show grid lines
    pub show_grid: bool,
    /// Line width for all series
    pub line_width: f32,
    /// Manual X-axis bounds; `None` follows the full trace span
    pub x_bounds: Option<(f64, f64)>,
    /// Active time cursor position
    pub cursor: Option<f64>,
}

impl Default for TimelineView {
    fn default() -> Self {
        Self {
            show_legend: true,
            show_grid: true,
            line_width: 1.5,
            x_bounds: None,
            cursor: None,
        }
    }
}

impl TimelineView {
    /// Create a view from persisted UI preferences
    pub fn from_preferences(prefs: &UiPreferences) -> Self {
        Self {
            show_legend: prefs.show_legend,
            show_grid: prefs.show_grid,
            line_width: prefs.line_width,
            ..Default::default()
        }
    }

    /// Place the active cursor
    pub fn set_cursor(&mut self, time: f64) {
        self.cursor = Some(time);
    }

    pub fn clear_cursor(&mut self) {
        self.cursor = None;
    }

    /// Zoom to an explicit time range
    pub fn set_x_bounds(&mut self, min: f64, max: f64) {
        self.x_bounds = Some((min, max));
    }

    /// Reset to the full trace span
    pub fn reset_view(&mut self) {
        self.x_bounds = None;
    }

    /// Render the timeline. `span` is the full trace time range; `filter`
    /// hides series whose task does not pass.
    pub fn render(
        &mut self,
        ui: &mut Ui,
        graphs: &GraphSet,
        span: (f64, f64),
        filter: &EventFilter,
    ) -> TimelineResponse {
        let mut out = TimelineResponse::default();

        let mut plot = Plot::new("timeline")
            .allow_zoom(true)
            .allow_drag(self.x_bounds.is_some())
            .allow_boxed_zoom(true)
            .show_grid(self.show_grid)
            .x_axis_label("Time (s)")
            .y_axis_label("Lane");

        if self.show_legend {
            plot = plot.legend(
                Legend::default()
                    .position(Corner::RightTop)
                    .background_alpha(0.8),
            );
        }

        let x_bounds = self.x_bounds;
        let y_max = lane_ceiling(graphs);
        let cursor = self.cursor;
        let line_width = self.line_width;

        let response = plot.show(ui, |plot_ui| {
            let (x_min, x_max) = x_bounds.unwrap_or(span);
            if x_max > x_min {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [x_min, -0.5],
                    [x_max, y_max + 0.5],
                ));
            }

            for graph in graphs.iter() {
                let Some(pid) = graph.pid() else {
                    continue;
                };
                if !filter.pass(pid) || graph.points().is_empty() {
                    continue;
                }

                // Unnamed series stay out of the egui_plot legend, so the
                // legend shows exactly the registered membership
                let name = if graph.in_legend {
                    graph.series_label().unwrap_or_default()
                } else {
                    String::new()
                };

                let width = if graph.selected {
                    line_width * 2.0
                } else {
                    line_width
                };

                let line = Line::new(name, PlotPoints::from(graph.points().to_vec()))
                    .color(graph.color)
                    .width(width);
                plot_ui.line(line);
            }

            if let Some(cursor) = cursor {
                let vline = VLine::new("cursor", cursor)
                    .color(Color32::from_rgba_unmultiplied(255, 255, 255, 96))
                    .width(1.0);
                plot_ui.vline(vline);
            }
        });

        if response.response.clicked() {
            if let Some(pos) = response.response.interact_pointer_pos() {
                let value = response.transform.value_from_position(pos);
                let (x_min, x_max) = x_bounds.unwrap_or(span);
                let x_tolerance = (x_max - x_min).abs() / 100.0;
                out.clicked = Some(PlotClick {
                    time: value.x,
                    hit: hit_test(graphs, filter, value.x, value.y, x_tolerance),
                });
            }
        }

        out
    }
}

/// Highest lane value across all plotted series
fn lane_ceiling(graphs: &GraphSet) -> f64 {
    graphs
        .iter()
        .flat_map(|g| g.points().iter().map(|p| p[1]))
        .fold(1.0, f64::max)
}

/// Find the graph nearest to a click, if within tolerance.
///
/// Distance combines lane offset with a scaled time offset; filtered-out and
/// taskless graphs are never hit.
pub fn hit_test(
    graphs: &GraphSet,
    filter: &EventFilter,
    x: f64,
    y: f64,
    x_tolerance: f64,
) -> Option<GraphId> {
    let mut best: Option<(GraphId, f64)> = None;
    let x_scale = x_tolerance.max(f64::EPSILON);

    for graph in graphs.iter() {
        let Some(pid) = graph.pid() else {
            continue;
        };
        if !filter.pass(pid) {
            continue;
        }

        for p in graph.points() {
            let dx = (p[0] - x) / x_scale;
            let dy = p[1] - y;
            let d = (dx * dx + dy * dy).sqrt();
            if d <= HIT_TOLERANCE && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((graph.id(), d));
            }
        }
    }

    best.map(|(id, _)| id)
}
