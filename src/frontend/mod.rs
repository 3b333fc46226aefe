//! Frontend module for the egui UI
//!
//! The application shell is a fixed layout: a menu bar on top, the timeline
//! plot in the center, and the task info bar at the bottom, with the task
//! selection dialog floating above. Panels and dialogs return [`AppAction`]s
//! which [`TraceVisApp::apply_action`] applies centrally; nothing mutates the
//! plot or the trace model from inside a render closure.
//!
//! # Main Types
//!
//! - [`TraceVisApp`] - Main application state implementing [`eframe::App`]
//! - [`TimelineView`] - Plot configuration and rendering
//! - [`TaskInfoPanel`] - Focused-task actions
//! - [`LegendMembership`] - At-most-once legend tracking

pub mod dialogs;
pub mod graph;
pub mod legend;
pub mod state;
pub mod task_info;
pub mod task_model;
pub mod timeline;

pub use graph::{GraphId, GraphKind, GraphSet, TaskGraphView};
pub use legend::{DeferredLegendSink, LegendMembership, LegendSink};
pub use state::{AppAction, DialogId};
pub use task_info::TaskInfoPanel;
pub use task_model::TaskModel;
pub use timeline::TimelineView;

use std::path::PathBuf;

use crossbeam_channel::{Receiver, TryRecvError};

use crate::config::AppState;
use crate::error::Result;
use crate::loader;
use crate::trace::{EventFilter, TraceSession};
use crate::types::Pid;

use dialogs::{show_dialog, TaskSelectContext, TaskSelectDialog, TaskSelectState};

/// Background session load in flight
struct SessionLoad {
    path: PathBuf,
    rx: Receiver<Result<TraceSession>>,
}

impl SessionLoad {
    /// Read and decode `path` off the UI thread.
    fn start(path: PathBuf) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let thread_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name("session-load".to_string())
            .spawn(move || {
                let result = loader::read_all(&thread_path)
                    .and_then(|bytes| TraceSession::from_bytes(&bytes));
                let _ = tx.send(result);
            });
        if let Err(e) = spawned {
            tracing::error!("failed to spawn session load thread: {}", e);
        }
        Self { path, rx }
    }

    /// Poll for completion. A disconnected channel counts as a failure.
    fn poll(&self) -> Option<Result<TraceSession>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(crate::error::TraceVisError::Channel(
                "session load thread died".to_string(),
            ))),
        }
    }
}

/// Main application state for the trace visualizer
pub struct TraceVisApp {
    app_state: AppState,

    // Trace model
    session: Option<TraceSession>,
    session_path: Option<PathBuf>,
    filter: EventFilter,

    // Plot state
    graphs: GraphSet,
    timeline: TimelineView,
    task_info: TaskInfoPanel,

    // Dialogs
    task_select_open: bool,
    task_select: TaskSelectState,

    // In-flight load
    loading: Option<SessionLoad>,

    last_error: Option<String>,
}

impl TraceVisApp {
    pub fn new(cc: &eframe::CreationContext<'_>, app_state: AppState) -> Self {
        if app_state.ui_preferences.dark_mode {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
        } else {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
        }

        let timeline = TimelineView::from_preferences(&app_state.ui_preferences);

        let loading = app_state
            .get_last_trace()
            .map(|p| SessionLoad::start(p.to_path_buf()));
        if let Some(load) = &loading {
            tracing::info!("Restoring last trace from {:?}", load.path);
        }

        Self {
            app_state,
            session: None,
            session_path: None,
            filter: EventFilter::default(),
            graphs: GraphSet::new(),
            timeline,
            task_info: TaskInfoPanel::new(),
            task_select_open: false,
            task_select: TaskSelectState::default(),
            loading,
            last_error: None,
        }
    }

    /// Apply one action emitted by a panel or dialog.
    fn apply_action(&mut self, ctx: &egui::Context, action: AppAction) {
        tracing::debug!(?action, "applying action");
        match action {
            AppAction::AddTaskGraph(pid) => self.add_unified_graph(pid, ctx),
            AppAction::RemoveTaskGraph(pid) => self.remove_unified_graph(pid, ctx),
            AppAction::AddToLegend(pid) => self.add_pid_to_legend(pid, ctx),
            AppAction::FindWakeup(pid) => self.find_wakeup(pid, ctx),
            AppAction::CreateFilter(map) => {
                self.filter.set(map);
                ctx.request_repaint();
            }
            AppAction::ResetFilter => {
                self.filter.reset();
                ctx.request_repaint();
            }
            AppAction::OpenTrace(path) => {
                self.loading = Some(SessionLoad::start(path));
            }
            AppAction::CloseTrace => self.close_session(),
            AppAction::ClearAllGraphs => self.clear_all_graphs(ctx),
            AppAction::OpenDialog(DialogId::TaskSelect) => {
                self.task_select_open = true;
                self.task_select.set_visible(true);
                self.task_select.resize_columns_to_contents();
            }
        }
    }

    /// Create the persistent unified graph for a task, with the task's first
    /// per-CPU graph as legend representative.
    fn add_unified_graph(&mut self, pid: Pid, ctx: &egui::Context) {
        let Some(session) = &self.session else {
            return;
        };
        if self.graphs.unified_for(pid).is_some() {
            tracing::debug!(pid, "unified graph already present");
            return;
        }
        let Some(task) = session.tasks.iter().find(|t| t.pid == pid) else {
            tracing::debug!(pid, "no task record for pid");
            return;
        };

        let lane = session.meta.nr_cpus as f64
            + self
                .graphs
                .iter()
                .filter(|g| g.kind() == GraphKind::Unified)
                .count() as f64;
        let points: Vec<[f64; 2]> = session
            .events
            .iter()
            .filter(|e| e.pid == pid)
            .map(|e| [e.time, lane])
            .collect();

        let rep = self.graphs.per_cpu_rep_for(pid);
        let view = self.graphs.create(GraphKind::Unified);
        view.set_task(task.identity());
        view.set_legend_rep(rep);
        view.set_points(points);
        ctx.request_repaint();
    }

    /// Destroy the unified graph for a task and purge its legend record.
    fn remove_unified_graph(&mut self, pid: Pid, ctx: &egui::Context) {
        let Some(id) = self.graphs.unified_for(pid).map(|g| g.id()) else {
            return;
        };

        // The removal event itself unregisters the legend series; the
        // panel's record purge below assumes this already happened
        if let Some(legend_graph) = self.task_info.legend().graph_for(pid) {
            if let Some(view) = self.graphs.get_mut(legend_graph) {
                view.in_legend = false;
            }
        }

        self.graphs.remove(id);
        self.task_info.on_task_removed(pid);
        self.task_info.reconcile(&self.graphs);
        ctx.request_repaint();
    }

    /// Register a task's graph in the legend (dialog-driven path).
    fn add_pid_to_legend(&mut self, pid: Pid, ctx: &egui::Context) {
        let target = self
            .graphs
            .unified_for(pid)
            .map(|g| g.legend_rep().unwrap_or_else(|| g.id()))
            .or_else(|| self.graphs.per_cpu_rep_for(pid));
        let Some(target) = target else {
            tracing::debug!(pid, "no graph to add to legend");
            return;
        };

        let mut sink = DeferredLegendSink::new();
        self.task_info
            .add_graph_to_legend(&self.graphs, target, &mut sink);
        sink.apply(&mut self.graphs, ctx);
    }

    /// Move the cursor to the preceding wakeup of a task.
    fn find_wakeup(&mut self, pid: Pid, ctx: &egui::Context) {
        let Some(session) = &self.session else {
            return;
        };
        let Some(cursor) = self.timeline.cursor else {
            tracing::debug!(pid, "find wakeup without an active cursor");
            return;
        };

        match session.find_wakeup(pid, cursor) {
            Some(time) => {
                self.timeline.set_cursor(time);
                ctx.request_repaint();
            }
            None => tracing::debug!(pid, cursor, "no preceding wakeup"),
        }
    }

    /// Remove every unified graph and clear the legend.
    fn clear_all_graphs(&mut self, ctx: &egui::Context) {
        let unified: Vec<(Pid, GraphId)> = self
            .graphs
            .iter()
            .filter(|g| g.kind() == GraphKind::Unified)
            .filter_map(|g| g.pid().map(|pid| (pid, g.id())))
            .collect();
        for (pid, id) in unified {
            self.graphs.remove(id);
            self.task_info.on_task_removed(pid);
        }

        let mut sink = DeferredLegendSink::new();
        self.task_info.clear_legend(&mut sink);
        sink.apply(&mut self.graphs, ctx);

        self.task_info.reconcile(&self.graphs);
    }

    /// Install a freshly loaded session: rebuild per-CPU graphs and reset
    /// the task model inside a reset bracket.
    fn install_session(&mut self, session: TraceSession, path: PathBuf) {
        tracing::info!(
            name = %session.meta.name,
            tasks = session.tasks.len(),
            events = session.events.len(),
            "session loaded"
        );

        self.graphs.clear();
        self.task_info.clear();
        self.filter.reset();
        self.timeline.reset_view();
        self.timeline.clear_cursor();

        for task in &session.tasks {
            for cpu in session.cpus_for(task.pid) {
                let points: Vec<[f64; 2]> = session
                    .events
                    .iter()
                    .filter(|e| e.pid == task.pid && e.cpu == cpu)
                    .map(|e| [e.time, cpu as f64])
                    .collect();
                let view = self.graphs.create(GraphKind::PerCpu(cpu));
                view.set_task(task.identity());
                view.set_points(points);
            }
        }

        self.task_select.model.begin_reset();
        self.task_select
            .model
            .set_task_map(session.task_map(), session.span_secs());
        self.task_select.model.end_reset();
        self.task_select.clear_selection();
        self.task_select.resize_columns_to_contents();

        self.app_state.add_recent_trace(&path, &session.meta.name);
        if let Err(e) = self.app_state.save() {
            tracing::warn!("failed to save app state: {}", e);
        }

        self.session = Some(session);
        self.session_path = Some(path);
        self.last_error = None;
    }

    /// Tear down the current session.
    fn close_session(&mut self) {
        self.session = None;
        self.session_path = None;
        self.filter.reset();
        self.graphs.clear();
        self.task_info.clear();
        self.timeline.clear_cursor();
        self.timeline.reset_view();

        self.task_select.model.begin_reset();
        self.task_select
            .model
            .set_task_map(Default::default(), 0.0);
        self.task_select.model.end_reset();
        self.task_select.clear_selection();
    }

    /// Handle a click on the timeline: place the cursor, update selection,
    /// and refocus the info panel.
    fn handle_plot_click(&mut self, click: timeline::PlotClick) {
        self.timeline.set_cursor(click.time);
        self.graphs.clear_selection();

        match click.hit {
            Some(hit) => {
                if let Some(view) = self.graphs.get_mut(hit) {
                    view.selected = true;
                }
                if let Some(view) = self.graphs.get(hit) {
                    self.task_info.set_focus(view);
                }
                // The panel may have captured a legend representative other
                // than the clicked view; keep it in the selected set so the
                // next reconcile does not drop focus
                if let Some(focused) = self.task_info.focused() {
                    if let Some(view) = self.graphs.get_mut(focused) {
                        view.selected = true;
                    }
                }
            }
            None => self.task_info.reconcile(&self.graphs),
        }
    }

    fn render_menu_bar(&mut self, ui: &mut egui::Ui, actions: &mut Vec<AppAction>) {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Trace...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .set_title("Open Trace Session")
                        .add_filter("Trace sessions", &["json"])
                        .pick_file()
                    {
                        actions.push(AppAction::OpenTrace(path));
                    }
                    ui.close();
                }

                ui.menu_button("Open Recent", |ui| {
                    if self.app_state.recent_traces.is_empty() {
                        ui.label("No recent traces");
                    }
                    let recents: Vec<(String, PathBuf)> = self
                        .app_state
                        .recent_traces
                        .iter()
                        .map(|t| (t.name.clone(), t.path.clone()))
                        .collect();
                    for (name, path) in recents {
                        if ui.button(format!("{} ({})", name, path.display())).clicked() {
                            actions.push(AppAction::OpenTrace(path));
                            ui.close();
                        }
                    }
                });

                if ui
                    .add_enabled(self.session.is_some(), egui::Button::new("Close Trace"))
                    .clicked()
                {
                    actions.push(AppAction::CloseTrace);
                    ui.close();
                }

                ui.separator();
                if ui.button("Quit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("View", |ui| {
                if ui.button("Tasks...").clicked() {
                    actions.push(AppAction::OpenDialog(DialogId::TaskSelect));
                    ui.close();
                }
                if ui
                    .add_enabled(
                        self.session.is_some(),
                        egui::Button::new("Clear All Graphs"),
                    )
                    .clicked()
                {
                    actions.push(AppAction::ClearAllGraphs);
                    ui.close();
                }
                if ui.button("Reset Zoom").clicked() {
                    self.timeline.reset_view();
                    ui.close();
                }

                ui.separator();
                if ui
                    .checkbox(&mut self.timeline.show_legend, "Show Legend")
                    .changed()
                {
                    self.app_state.ui_preferences.show_legend = self.timeline.show_legend;
                }
                if ui
                    .checkbox(&mut self.timeline.show_grid, "Show Grid")
                    .changed()
                {
                    self.app_state.ui_preferences.show_grid = self.timeline.show_grid;
                }
            });

            if self.loading.is_some() {
                ui.separator();
                ui.spinner();
                ui.label("Loading trace...");
            }

            if self.filter.is_active() {
                ui.separator();
                ui.label(format!(
                    "Filter: {} tasks",
                    self.filter.pids().count()
                ));
            }

            if let Some(name) = self
                .session_path
                .as_deref()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
            {
                ui.separator();
                ui.label(
                    egui::RichText::new(format!("Trace: {}", name))
                        .small()
                        .color(egui::Color32::from_rgb(150, 150, 200)),
                );
            }
        });
    }
}

impl eframe::App for TraceVisApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Finish any in-flight load
        if let Some(load) = &self.loading {
            if let Some(result) = load.poll() {
                let path = load.path.clone();
                self.loading = None;
                match result {
                    Ok(session) => self.install_session(session, path),
                    Err(e) => {
                        tracing::error!("failed to load {:?}: {}", path, e);
                        self.app_state.remove_recent_trace(&path);
                        self.last_error = Some(format!("Failed to load trace: {}", e));
                    }
                }
            } else {
                // Keep polling while the loader runs
                ctx.request_repaint_after(std::time::Duration::from_millis(100));
            }
        }

        let mut actions: Vec<AppAction> = Vec::new();

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.render_menu_bar(ui, &mut actions);
        });

        egui::TopBottomPanel::bottom("task_info_bar").show(ctx, |ui| {
            if let Some(error) = self.last_error.clone() {
                ui.horizontal(|ui| {
                    ui.colored_label(egui::Color32::LIGHT_RED, &error);
                    if ui.small_button("×").clicked() {
                        self.last_error = None;
                    }
                });
                ui.separator();
            }

            let response = self.task_info.render(ui, &self.graphs);
            actions.extend(response.actions);

            if response.add_to_legend {
                let mut sink = DeferredLegendSink::new();
                self.task_info
                    .add_focused_to_legend(&self.graphs, &mut sink);
                sink.apply(&mut self.graphs, ctx);
            }
            if response.clear_legend {
                let mut sink = DeferredLegendSink::new();
                self.task_info.clear_legend(&mut sink);
                sink.apply(&mut self.graphs, ctx);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            match &self.session {
                Some(session) => {
                    let span = session.span();
                    let response =
                        self.timeline
                            .render(ui, &self.graphs, span, &self.filter);
                    if let Some(click) = response.clicked {
                        self.handle_plot_click(click);
                    }
                }
                None => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("No trace loaded");
                        ui.label("Open a trace session from the File menu.");
                    });
                }
            }
        });

        if self.task_select_open {
            let dialog_ctx = TaskSelectContext {
                session_loaded: self.session.is_some(),
            };
            let was_open = self.task_select_open;
            if let Some(batch) = show_dialog::<TaskSelectDialog>(
                ctx,
                &mut self.task_select_open,
                &mut self.task_select,
                dialog_ctx,
            ) {
                actions.extend(batch);
            }
            if was_open && !self.task_select_open {
                self.task_select.set_visible(false);
            }
        }

        for action in actions {
            self.apply_action(ctx, action);
        }
    }

    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        if let Err(e) = self.app_state.save() {
            tracing::warn!("failed to save app state: {}", e);
        }
    }
}
