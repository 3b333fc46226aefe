//! Task selection dialog
//!
//! Modeless dialog listing every task in the loaded trace. The user
//! multi-selects rows and dispatches one batch request per action: one
//! add-graph or add-to-legend event per selected task, or a single
//! create-filter event carrying the whole pid mapping.

use std::collections::{BTreeMap, BTreeSet};

use egui::Ui;

use super::{Dialog, DialogAction, DialogState};
use crate::frontend::state::AppAction;
use crate::frontend::task_model::{TaskModel, COLUMNS};
use crate::types::IDLE_PID;

/// Approximate pixel width of one character in the table font
const CHAR_WIDTH: f32 = 8.0;
/// Horizontal padding added to each sized column
const COLUMN_PADDING: f32 = 16.0;

/// State for the task selection dialog
#[derive(Debug, Default)]
pub struct TaskSelectState {
    /// Table model; long-lived, replaced only via reset bracketing
    pub model: TaskModel,
    /// Currently highlighted rows; transient, cleared on close and reset
    selection: BTreeSet<usize>,
    /// Whether the dialog is currently shown
    visible: bool,
    /// Content-derived column widths, if computed
    col_widths: Option<[f32; 4]>,
}

impl DialogState for TaskSelectState {
    fn on_close(&mut self) {
        self.selection.clear();
        self.visible = false;
    }
}

impl TaskSelectState {
    /// Mark the dialog shown or hidden. Column sizing only happens while
    /// shown.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Handle a row click. `multi` extends the selection instead of
    /// replacing it.
    pub fn click_row(&mut self, row: usize, multi: bool) {
        if multi {
            if !self.selection.remove(&row) {
                self.selection.insert(row);
            }
        } else {
            self.selection.clear();
            self.selection.insert(row);
        }
    }

    pub fn is_selected(&self, row: usize) -> bool {
        self.selection.contains(&row)
    }

    /// Selected rows in row order.
    pub fn selection(&self) -> impl Iterator<Item = usize> + '_ {
        self.selection.iter().copied()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// One add-graph request per selected task, in row order. Rows that fail
    /// to resolve and rows resolving to the idle sentinel are skipped.
    pub fn request_add_graphs(&self) -> Vec<AppAction> {
        self.selection()
            .filter_map(|row| self.model.row_to_pid(row))
            .filter(|&pid| pid != IDLE_PID)
            .map(AppAction::AddTaskGraph)
            .collect()
    }

    /// One add-to-legend request per selected task, in row order, with the
    /// same skip rules as [`request_add_graphs`].
    ///
    /// [`request_add_graphs`]: TaskSelectState::request_add_graphs
    pub fn request_add_to_legend(&self) -> Vec<AppAction> {
        self.selection()
            .filter_map(|row| self.model.row_to_pid(row))
            .filter(|&pid| pid != IDLE_PID)
            .map(AppAction::AddToLegend)
            .collect()
    }

    /// A single create-filter request carrying every resolved pid as a
    /// pid-to-pid mapping. Unlike the graph requests, the idle sentinel is
    /// kept: filtering on the idle task is meaningful. Duplicates collapse
    /// in the map.
    pub fn request_create_filter(&self) -> AppAction {
        let mut map = BTreeMap::new();
        for row in self.selection() {
            if let Some(pid) = self.model.row_to_pid(row) {
                map.insert(pid, pid);
            }
        }
        AppAction::CreateFilter(map)
    }

    /// Recompute column widths from the current content.
    ///
    /// A no-op while the dialog is hidden; sizing a hidden table is wasted
    /// work that would be redone on show anyway.
    pub fn resize_columns_to_contents(&mut self) {
        if !self.visible {
            return;
        }

        let mut chars = [0usize; 4];
        for (i, header) in COLUMNS.iter().enumerate() {
            chars[i] = header.len();
        }
        for row in 0..self.model.row_count() {
            let cells = [
                self.model.row_to_name(row).map(|s| s.len()),
                self.model.row_to_pid(row).map(|p| p.to_string().len()),
                self.model.row_to_pct(row).map(|s| s.len()),
                self.model.row_to_time(row).map(|s| s.len()),
            ];
            for (i, len) in cells.iter().enumerate() {
                if let Some(len) = len {
                    chars[i] = chars[i].max(*len);
                }
            }
        }

        self.col_widths = Some(chars.map(|c| c as f32 * CHAR_WIDTH + COLUMN_PADDING));
    }

    pub fn column_widths(&self) -> Option<[f32; 4]> {
        self.col_widths
    }
}

/// Context needed to render the task selection dialog
pub struct TaskSelectContext {
    /// Whether a trace session is loaded; dispatch buttons disable otherwise
    pub session_loaded: bool,
}

/// The task selection dialog
pub struct TaskSelectDialog;

impl Dialog for TaskSelectDialog {
    type State = TaskSelectState;
    type Action = Vec<AppAction>;
    type Context<'a> = TaskSelectContext;

    fn title() -> &'static str {
        "Tasks"
    }

    fn default_size() -> (f32, Option<f32>) {
        (420.0, Some(500.0))
    }

    fn render(
        state: &mut Self::State,
        ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action> {
        let mut action = DialogAction::None;

        ui.label(format!("{} tasks", state.model.row_count()));
        ui.separator();

        let widths = state.col_widths;
        let mut clicked_row: Option<(usize, bool)> = None;

        egui::ScrollArea::vertical()
            .max_height(360.0)
            .show(ui, |ui| {
                egui::Grid::new("task_table")
                    .striped(true)
                    .num_columns(COLUMNS.len())
                    .show(ui, |ui| {
                        for header in COLUMNS {
                            ui.label(egui::RichText::new(*header).strong());
                        }
                        ui.end_row();

                        for row in 0..state.model.row_count() {
                            let selected = state.is_selected(row);
                            let cells = [
                                state.model.row_to_name(row).unwrap_or("-").to_string(),
                                state
                                    .model
                                    .row_to_pid(row)
                                    .map(|p| p.to_string())
                                    .unwrap_or_else(|| "-".to_string()),
                                state.model.row_to_pct(row).unwrap_or_else(|| "-".to_string()),
                                state.model.row_to_time(row).unwrap_or_else(|| "-".to_string()),
                            ];

                            let mut row_clicked = false;
                            for (i, cell) in cells.iter().enumerate() {
                                let response = match widths {
                                    Some(w) => ui
                                        .add_sized(
                                            [w[i], 18.0],
                                            egui::Button::selectable(selected, cell),
                                        ),
                                    None => ui.selectable_label(selected, cell),
                                };
                                row_clicked |= response.clicked();
                            }
                            ui.end_row();

                            if row_clicked {
                                let multi = ui.input(|i| i.modifiers.command);
                                clicked_row = Some((row, multi));
                            }
                        }
                    });
            });

        if let Some((row, multi)) = clicked_row {
            state.click_row(row, multi);
        }

        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("Close").clicked() {
                action = DialogAction::Close;
            }
            if ui
                .add_enabled(ctx.session_loaded, egui::Button::new("Add a unified graph"))
                .on_hover_text("Add a unified graph for every selected task")
                .clicked()
            {
                action = DialogAction::Emit(state.request_add_graphs());
            }
            if ui
                .add_enabled(ctx.session_loaded, egui::Button::new("Add to legend"))
                .on_hover_text("Add every selected task to the legend")
                .clicked()
            {
                action = DialogAction::Emit(state.request_add_to_legend());
            }
        });

        ui.horizontal(|ui| {
            if ui
                .add_enabled(ctx.session_loaded, egui::Button::new("Create events filter"))
                .on_hover_text("Restrict the event display to the selected tasks")
                .clicked()
            {
                action = DialogAction::Emit(vec![state.request_create_filter()]);
            }
            if ui
                .add_enabled(ctx.session_loaded, egui::Button::new("Reset events filter"))
                .clicked()
            {
                action = DialogAction::Emit(vec![AppAction::ResetFilter]);
            }
        });

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Pid, TaskRecord};

    fn state_with(pids: &[(Pid, &str)]) -> TaskSelectState {
        let mut map = BTreeMap::new();
        for &(pid, name) in pids {
            map.insert(pid, TaskRecord::new(pid, name));
        }
        let mut state = TaskSelectState::default();
        state.model.begin_reset();
        state.model.set_task_map(map, 1.0);
        state.model.end_reset();
        state
    }

    #[test]
    fn test_add_graphs_skips_unresolvable_and_sentinel() {
        // Rows: 0 -> pid 0 (sentinel), 1 -> pid 7, 2 -> pid 42
        let mut state = state_with(&[(0, "swapper"), (7, "irq/7"), (42, "sshd")]);
        state.click_row(0, true);
        state.click_row(1, true);
        state.click_row(2, true);
        state.click_row(99, true); // unresolvable row

        let actions = state.request_add_graphs();
        assert_eq!(
            actions,
            vec![AppAction::AddTaskGraph(7), AppAction::AddTaskGraph(42)]
        );
    }

    #[test]
    fn test_add_to_legend_row_order() {
        let mut state = state_with(&[(7, "irq/7"), (42, "sshd"), (100, "cc1")]);
        // Click out of order; dispatch is still in row order
        state.click_row(2, true);
        state.click_row(0, true);

        let actions = state.request_add_to_legend();
        assert_eq!(
            actions,
            vec![AppAction::AddToLegend(7), AppAction::AddToLegend(100)]
        );
    }

    #[test]
    fn test_sentinel_only_selection_emits_nothing() {
        let mut state = state_with(&[(0, "swapper")]);
        state.click_row(0, false);
        assert!(state.request_add_graphs().is_empty());
        assert!(state.request_add_to_legend().is_empty());
    }

    #[test]
    fn test_create_filter_keeps_sentinel_and_collapses() {
        let mut state = state_with(&[(0, "swapper"), (9, "ksoftirqd")]);
        state.click_row(0, true);
        state.click_row(1, true);
        state.click_row(99, true); // unresolvable, skipped

        let action = state.request_create_filter();
        let AppAction::CreateFilter(map) = action else {
            panic!("expected CreateFilter");
        };
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&0), Some(&0));
        assert_eq!(map.get(&9), Some(&9));
    }

    #[test]
    fn test_create_filter_on_empty_selection_is_empty_map() {
        let state = state_with(&[(7, "irq/7")]);
        let AppAction::CreateFilter(map) = state.request_create_filter() else {
            panic!("expected CreateFilter");
        };
        assert!(map.is_empty());
    }

    #[test]
    fn test_plain_click_replaces_selection() {
        let mut state = state_with(&[(7, "a"), (8, "b"), (9, "c")]);
        state.click_row(0, false);
        state.click_row(2, false);
        assert_eq!(state.selection().collect::<Vec<_>>(), vec![2]);

        state.click_row(0, true);
        assert_eq!(state.selection().collect::<Vec<_>>(), vec![0, 2]);

        // Ctrl-click on a selected row deselects it
        state.click_row(2, true);
        assert_eq!(state.selection().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_resize_columns_noop_while_hidden() {
        let mut state = state_with(&[(7, "some-rather-long-task-name")]);
        state.resize_columns_to_contents();
        assert!(state.column_widths().is_none());

        state.set_visible(true);
        state.resize_columns_to_contents();
        let widths = state.column_widths().unwrap();
        // Name column grew past its header width
        assert!(widths[0] > "Task".len() as f32 * CHAR_WIDTH);
    }

    #[test]
    fn test_on_close_clears_selection_not_model() {
        let mut state = state_with(&[(7, "irq/7")]);
        state.set_visible(true);
        state.click_row(0, false);

        state.on_close();
        assert_eq!(state.selection().count(), 0);
        assert!(!state.is_visible());
        assert_eq!(state.model.row_count(), 1);
    }
}
