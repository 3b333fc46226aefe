//! Task info panel
//!
//! Horizontal bar showing the currently focused task's name and pid, with a
//! small toolbar of actions operating on that task: add/remove its unified
//! graph, add it to the legend, clear the legend, and find its preceding
//! wakeup. Focus follows graph selection on the timeline.
//!
//! All dispatch logic lives on [`TaskInfoPanel`] methods so it can be tested
//! without a running UI; the render function only wires buttons to them.

use egui::Ui;

use super::graph::{GraphId, GraphSet, TaskGraphView};
use super::legend::{LegendMembership, LegendSink};
use super::state::AppAction;
use crate::types::Pid;

/// Result of rendering the panel: outbound actions plus the two local
/// legend operations, which the app applies with a sink it constructs.
#[derive(Default)]
pub struct TaskInfoResponse {
    pub actions: Vec<AppAction>,
    pub add_to_legend: bool,
    pub clear_legend: bool,
}

/// Tracks the focused task graph and dispatches the five panel actions
pub struct TaskInfoPanel {
    focused: Option<GraphId>,
    name_text: String,
    pid_text: String,
    legend: LegendMembership,
}

impl Default for TaskInfoPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskInfoPanel {
    pub fn new() -> Self {
        Self {
            focused: None,
            name_text: String::new(),
            pid_text: String::new(),
            legend: LegendMembership::new(),
        }
    }

    /// Focus a graph view.
    ///
    /// Ignored if the view's task is unset (the task was removed), leaving
    /// prior focus untouched. If the view designates a legend
    /// representative, that view is captured instead; the representative is
    /// resolved once here and never re-chased.
    pub fn set_focus(&mut self, view: &TaskGraphView) {
        let Some(task) = view.task() else {
            return;
        };

        self.name_text = task.name.clone();
        self.pid_text = task.pid.to_string();
        self.focused = Some(view.legend_rep().unwrap_or_else(|| view.id()));
    }

    /// Drop focus and clear the displayed text.
    pub fn clear_focus(&mut self) {
        self.focused = None;
        self.name_text.clear();
        self.pid_text.clear();
    }

    /// Called when graph selection may have changed: focus is dropped if the
    /// focused view no longer exists or is no longer visually selected.
    pub fn reconcile(&mut self, graphs: &GraphSet) {
        let Some(focused) = self.focused else {
            return;
        };
        match graphs.get(focused) {
            Some(view) if view.selected => {}
            _ => self.clear_focus(),
        }
    }

    pub fn focused(&self) -> Option<GraphId> {
        self.focused
    }

    pub fn legend(&self) -> &LegendMembership {
        &self.legend
    }

    /// Pid of the focused view's task, if focus is set and the view still
    /// exists with a task attached.
    fn focused_pid(&self, graphs: &GraphSet) -> Option<Pid> {
        self.focused
            .and_then(|id| graphs.get(id))
            .and_then(|g| g.pid())
    }

    /// Add the focused view to the legend. No-op when unfocused.
    pub fn add_focused_to_legend(&mut self, graphs: &GraphSet, sink: &mut dyn LegendSink) -> bool {
        let Some(focused) = self.focused else {
            return false;
        };
        self.add_graph_to_legend(graphs, focused, sink)
    }

    /// Register an arbitrary graph's task in the legend, used for
    /// dialog-driven adds. No-op if the graph or its task is gone.
    pub fn add_graph_to_legend(
        &mut self,
        graphs: &GraphSet,
        graph: GraphId,
        sink: &mut dyn LegendSink,
    ) -> bool {
        let Some(pid) = graphs.get(graph).and_then(|g| g.pid()) else {
            return false;
        };
        self.legend.add(pid, graph, sink)
    }

    /// Request a persistent unified graph for the focused task.
    pub fn request_add_graph(&self, graphs: &GraphSet) -> Option<AppAction> {
        self.focused_pid(graphs).map(AppAction::AddTaskGraph)
    }

    /// Request removal of the focused task's unified graph.
    pub fn request_remove_graph(&self, graphs: &GraphSet) -> Option<AppAction> {
        self.focused_pid(graphs).map(AppAction::RemoveTaskGraph)
    }

    /// Request a search for the focused task's preceding wakeup.
    pub fn request_find_wakeup(&self, graphs: &GraphSet) -> Option<AppAction> {
        self.focused_pid(graphs).map(AppAction::FindWakeup)
    }

    /// Remove every task from the legend, with a single replot.
    pub fn clear_legend(&mut self, sink: &mut dyn LegendSink) {
        self.legend.remove_all(sink);
    }

    /// External notification that a task's graph went away: purge the pid
    /// from the legend record. The sink-side unregistration is assumed
    /// already done or pending from the originating event.
    pub fn on_task_removed(&mut self, pid: Pid) {
        self.legend.remove(pid);
    }

    /// Full reset on trace close: focus and legend record both dropped, no
    /// sink side effects since the plot is being torn down anyway.
    pub fn clear(&mut self) {
        self.clear_focus();
        self.legend = LegendMembership::new();
    }

    /// Render the info bar. Outbound actions and the local legend button
    /// presses are returned for the app to apply.
    pub fn render(&mut self, ui: &mut Ui, graphs: &GraphSet) -> TaskInfoResponse {
        let mut response = TaskInfoResponse::default();
        let has_focus = self.focused_pid(graphs).is_some();

        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.name_text)
                    .interactive(false)
                    .desired_width(160.0)
                    .hint_text("task"),
            );
            ui.label(":");
            ui.add(
                egui::TextEdit::singleline(&mut self.pid_text)
                    .interactive(false)
                    .desired_width(64.0)
                    .hint_text("pid"),
            );

            ui.separator();

            if ui
                .add_enabled(has_focus, egui::Button::new("Legend +"))
                .on_hover_text("Add this task to the legend")
                .clicked()
            {
                response.add_to_legend = true;
            }

            if ui
                .button("Legend ×")
                .on_hover_text("Remove all tasks from the legend")
                .clicked()
            {
                response.clear_legend = true;
            }

            if ui
                .add_enabled(has_focus, egui::Button::new("Find wakeup"))
                .on_hover_text("Find the wakeup of this task that precedes the active cursor")
                .clicked()
            {
                response.actions.extend(self.request_find_wakeup(graphs));
            }

            if ui
                .add_enabled(has_focus, egui::Button::new("Add graph"))
                .on_hover_text("Add a unified graph for this task")
                .clicked()
            {
                response.actions.extend(self.request_add_graph(graphs));
            }

            if ui
                .add_enabled(has_focus, egui::Button::new("Remove graph"))
                .on_hover_text("Remove the unified graph for this task")
                .clicked()
            {
                response.actions.extend(self.request_remove_graph(graphs));
            }
        });

        response
    }
}
