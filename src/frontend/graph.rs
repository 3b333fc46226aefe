//! Plotted task graphs
//!
//! A [`TaskGraphView`] associates one plotted series with a task identity.
//! Unified graphs aggregate a task across all CPUs and can be destroyed by
//! user action, so a unified graph may designate a longer-lived per-CPU
//! graph as its legend representative. Views live in a [`GraphSet`] and are
//! addressed by stable [`GraphId`]s; lookups are fallible since views are
//! destroyed by user action.

use egui::Color32;

use crate::types::{task_color, Pid, TaskIdentity};

/// Stable identifier of a graph view within a [`GraphSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId(u32);

/// What a graph view plots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    /// One task's activity on a single CPU
    PerCpu(u32),
    /// One task's activity aggregated across all CPUs
    Unified,
}

/// One plotted series tied to a task
#[derive(Debug, Clone)]
pub struct TaskGraphView {
    id: GraphId,
    kind: GraphKind,
    task: Option<TaskIdentity>,
    legend_rep: Option<GraphId>,
    /// Whether this view is currently registered in the shared legend
    pub in_legend: bool,
    /// Whether this view is currently visually selected
    pub selected: bool,
    pub color: Color32,
    points: Vec<[f64; 2]>,
}

impl TaskGraphView {
    fn new(id: GraphId, kind: GraphKind) -> Self {
        Self {
            id,
            kind,
            task: None,
            legend_rep: None,
            in_legend: false,
            selected: false,
            color: Color32::GRAY,
            points: Vec::new(),
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    /// Associate this view with a task and derive its series color.
    pub fn set_task(&mut self, task: TaskIdentity) {
        self.color = task_color(task.pid);
        self.task = Some(task);
    }

    /// Detach the view from its task (the task record went away).
    pub fn clear_task(&mut self) {
        self.task = None;
    }

    pub fn task(&self) -> Option<&TaskIdentity> {
        self.task.as_ref()
    }

    pub fn pid(&self) -> Option<Pid> {
        self.task.as_ref().map(|t| t.pid)
    }

    /// The view representing this one in the legend, if any.
    pub fn legend_rep(&self) -> Option<GraphId> {
        self.legend_rep
    }

    pub fn set_legend_rep(&mut self, rep: Option<GraphId>) {
        self.legend_rep = rep;
    }

    /// Label shown in the legend and on hover, "name:pid".
    pub fn series_label(&self) -> Option<String> {
        self.task.as_ref().map(|t| t.series_label())
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    pub fn set_points(&mut self, points: Vec<[f64; 2]>) {
        self.points = points;
    }
}

/// Owning collection of all graph views currently plotted
#[derive(Debug, Clone, Default)]
pub struct GraphSet {
    graphs: Vec<TaskGraphView>,
    next_id: u32,
}

impl GraphSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty view and return a mutable handle to fill it in.
    pub fn create(&mut self, kind: GraphKind) -> &mut TaskGraphView {
        let id = GraphId(self.next_id);
        self.next_id += 1;
        self.graphs.push(TaskGraphView::new(id, kind));
        self.graphs.last_mut().unwrap()
    }

    pub fn get(&self, id: GraphId) -> Option<&TaskGraphView> {
        self.graphs.iter().find(|g| g.id == id)
    }

    pub fn get_mut(&mut self, id: GraphId) -> Option<&mut TaskGraphView> {
        self.graphs.iter_mut().find(|g| g.id == id)
    }

    /// Remove a view. Returns true if it existed.
    pub fn remove(&mut self, id: GraphId) -> bool {
        let before = self.graphs.len();
        self.graphs.retain(|g| g.id != id);
        self.graphs.len() != before
    }

    /// The unified graph for a pid, if one exists.
    pub fn unified_for(&self, pid: Pid) -> Option<&TaskGraphView> {
        self.graphs
            .iter()
            .find(|g| g.kind == GraphKind::Unified && g.pid() == Some(pid))
    }

    /// The first per-CPU graph for a pid, used as a legend representative.
    pub fn per_cpu_rep_for(&self, pid: Pid) -> Option<GraphId> {
        self.graphs
            .iter()
            .find(|g| matches!(g.kind, GraphKind::PerCpu(_)) && g.pid() == Some(pid))
            .map(|g| g.id)
    }

    /// Drop the selected flag on every view.
    pub fn clear_selection(&mut self) {
        for g in &mut self.graphs {
            g.selected = false;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskGraphView> {
        self.graphs.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TaskGraphView> {
        self.graphs.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    pub fn clear(&mut self) {
        self.graphs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_assigns_unique_ids() {
        let mut set = GraphSet::new();
        let a = set.create(GraphKind::Unified).id();
        let b = set.create(GraphKind::PerCpu(0)).id();
        assert_ne!(a, b);
        assert!(set.get(a).is_some());
        assert!(set.get(b).is_some());
    }

    #[test]
    fn test_remove_makes_lookup_fail() {
        let mut set = GraphSet::new();
        let id = set.create(GraphKind::Unified).id();
        assert!(set.remove(id));
        assert!(set.get(id).is_none());
        assert!(!set.remove(id));
    }

    #[test]
    fn test_unified_lookup_by_pid() {
        let mut set = GraphSet::new();
        let g = set.create(GraphKind::Unified);
        g.set_task(TaskIdentity::new(42, "sshd"));

        assert!(set.unified_for(42).is_some());
        assert!(set.unified_for(7).is_none());
    }

    #[test]
    fn test_per_cpu_rep_prefers_per_cpu_graphs() {
        let mut set = GraphSet::new();
        let unified = set.create(GraphKind::Unified);
        unified.set_task(TaskIdentity::new(42, "sshd"));
        let unified_id = unified.id();

        let per_cpu = set.create(GraphKind::PerCpu(1));
        per_cpu.set_task(TaskIdentity::new(42, "sshd"));
        let per_cpu_id = per_cpu.id();

        let rep = set.per_cpu_rep_for(42).unwrap();
        assert_eq!(rep, per_cpu_id);
        assert_ne!(rep, unified_id);
    }

    #[test]
    fn test_clear_task_drops_label() {
        let mut set = GraphSet::new();
        let g = set.create(GraphKind::PerCpu(0));
        g.set_task(TaskIdentity::new(7, "irq/7"));
        assert_eq!(g.series_label().as_deref(), Some("irq/7:7"));

        g.clear_task();
        assert!(g.series_label().is_none());
        assert!(g.pid().is_none());
    }
}
