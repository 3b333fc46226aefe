//! Table model backing the task selection dialog
//!
//! The model consumes a pid-to-record map supplied wholesale; any
//! replacement must be bracketed by [`TaskModel::begin_reset`] and
//! [`TaskModel::end_reset`] so dependent views can adjust. Rows are derived
//! in ascending-pid order when the reset ends.
//!
//! Row resolvers return `Option`: `None` means the row failed to resolve,
//! which is distinct from resolving to the idle sentinel pid 0. Callers skip
//! both for graph and legend requests, but the contract keeps them apart.

use std::collections::BTreeMap;

use crate::types::{Pid, TaskRecord};

/// Column headers for the task table
pub const COLUMNS: &[&str] = &["Task", "PID", "CPU%", "Runtime (s)"];

/// Pid-ordered view over the task map, with formatting helpers
#[derive(Debug, Clone, Default)]
pub struct TaskModel {
    tasks: BTreeMap<Pid, TaskRecord>,
    rows: Vec<Pid>,
    span_secs: f64,
    resetting: bool,
}

impl TaskModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a model reset. Rows resolve to nothing until [`end_reset`].
    ///
    /// [`end_reset`]: TaskModel::end_reset
    pub fn begin_reset(&mut self) {
        self.resetting = true;
        self.rows.clear();
    }

    /// Replace the backing task map. Must be called inside a reset bracket.
    pub fn set_task_map(&mut self, map: BTreeMap<Pid, TaskRecord>, span_secs: f64) {
        if !self.resetting {
            tracing::warn!("task map replaced outside a begin_reset/end_reset bracket");
        }
        self.tasks = map;
        self.span_secs = span_secs;
    }

    /// Finish a model reset and rebuild the row index.
    pub fn end_reset(&mut self) {
        self.rows = self.tasks.keys().copied().collect();
        self.resetting = false;
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        COLUMNS.len()
    }

    pub fn header(&self, column: usize) -> Option<&'static str> {
        COLUMNS.get(column).copied()
    }

    /// Resolve a row to its pid. `None` on failure; note that a successful
    /// resolution may still yield the sentinel pid 0.
    pub fn row_to_pid(&self, row: usize) -> Option<Pid> {
        self.rows.get(row).copied()
    }

    /// Resolve a row to its task's display name.
    pub fn row_to_name(&self, row: usize) -> Option<&str> {
        let pid = self.row_to_pid(row)?;
        self.tasks.get(&pid).map(|t| t.name.as_str())
    }

    /// Resolve a row to its task's CPU share of the trace span, formatted.
    pub fn row_to_pct(&self, row: usize) -> Option<String> {
        let pid = self.row_to_pid(row)?;
        let task = self.tasks.get(&pid)?;
        task.cpu_percent(self.span_secs)
            .map(|pct| format!("{:.1}", pct))
    }

    /// Resolve a row to its task's accumulated runtime, formatted in seconds.
    pub fn row_to_time(&self, row: usize) -> Option<String> {
        let pid = self.row_to_pid(row)?;
        let task = self.tasks.get(&pid)?;
        Some(format!("{:.6}", task.runtime_secs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with(pids: &[(Pid, &str, u64)], span: f64) -> TaskModel {
        let mut map = BTreeMap::new();
        for &(pid, name, runtime_ns) in pids {
            let mut rec = TaskRecord::new(pid, name);
            rec.runtime_ns = runtime_ns;
            map.insert(pid, rec);
        }
        let mut model = TaskModel::new();
        model.begin_reset();
        model.set_task_map(map, span);
        model.end_reset();
        model
    }

    #[test]
    fn test_empty_model_resolves_nothing() {
        let model = TaskModel::new();
        assert_eq!(model.row_count(), 0);
        assert!(model.row_to_pid(0).is_none());
        assert!(model.row_to_name(0).is_none());
        assert!(model.row_to_pct(0).is_none());
        assert!(model.row_to_time(0).is_none());
    }

    #[test]
    fn test_rows_are_pid_ordered() {
        let model = model_with(
            &[(42, "sshd", 0), (0, "swapper", 0), (7, "irq/7", 0)],
            1.0,
        );
        assert_eq!(model.row_count(), 3);
        assert_eq!(model.row_to_pid(0), Some(0));
        assert_eq!(model.row_to_pid(1), Some(7));
        assert_eq!(model.row_to_pid(2), Some(42));
        assert_eq!(model.row_to_name(2), Some("sshd"));
    }

    #[test]
    fn test_sentinel_resolution_is_success() {
        // Pid 0 resolves successfully; only out-of-range rows fail
        let model = model_with(&[(0, "swapper", 0)], 1.0);
        assert_eq!(model.row_to_pid(0), Some(0));
        assert!(model.row_to_pid(1).is_none());
    }

    #[test]
    fn test_rows_empty_during_reset() {
        let mut model = model_with(&[(7, "irq/7", 0)], 1.0);
        assert_eq!(model.row_to_pid(0), Some(7));

        model.begin_reset();
        assert!(model.row_to_pid(0).is_none());
        model.set_task_map(BTreeMap::new(), 0.0);
        model.end_reset();
        assert_eq!(model.row_count(), 0);
    }

    #[test]
    fn test_pct_and_time_formatting() {
        // 0.25 s of runtime over a 10 s span
        let model = model_with(&[(42, "sshd", 250_000_000)], 10.0);
        assert_eq!(model.row_to_pct(0).as_deref(), Some("2.5"));
        assert_eq!(model.row_to_time(0).as_deref(), Some("0.250000"));
    }

    #[test]
    fn test_pct_unavailable_for_empty_span() {
        let model = model_with(&[(42, "sshd", 250_000_000)], 0.0);
        assert!(model.row_to_pct(0).is_none());
        // Runtime still resolves
        assert!(model.row_to_time(0).is_some());
    }

    #[test]
    fn test_headers() {
        let model = TaskModel::new();
        assert_eq!(model.column_count(), 4);
        assert_eq!(model.header(0), Some("Task"));
        assert_eq!(model.header(3), Some("Runtime (s)"));
        assert!(model.header(4).is_none());
    }
}
