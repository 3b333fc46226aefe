//! Core data types shared between the trace model and the frontend
//!
//! Tasks are schedulable entities (processes/threads) identified by a numeric
//! pid and a display name, as recorded in trace data. Pid 0 is the idle task
//! and is treated as a reserved "no task" sentinel by the selection dialogs.

use egui::Color32;
use serde::{Deserialize, Serialize};

/// Numeric task identifier as recorded in the trace.
pub type Pid = u32;

/// The idle task / "no task" sentinel identifier.
///
/// Selection dispatch skips this pid for graph and legend requests; the
/// event filter keeps it, since filtering on the idle task is meaningful.
pub const IDLE_PID: Pid = 0;

/// Immutable identity of a task: numeric identifier plus display name.
///
/// Uniqueness of the pid within a trace is assumed but not enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskIdentity {
    pub pid: Pid,
    pub name: String,
}

impl TaskIdentity {
    pub fn new(pid: Pid, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }

    /// Series label used for plotted graphs and legend entries.
    pub fn series_label(&self) -> String {
        format!("{}:{}", self.name, self.pid)
    }
}

/// A task as recorded in a trace session, with accumulated scheduling stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub pid: Pid,
    pub name: String,
    /// Accumulated on-CPU time over the trace, in nanoseconds.
    #[serde(default)]
    pub runtime_ns: u64,
}

impl TaskRecord {
    pub fn new(pid: Pid, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
            runtime_ns: 0,
        }
    }

    pub fn identity(&self) -> TaskIdentity {
        TaskIdentity::new(self.pid, self.name.clone())
    }

    /// Accumulated runtime in seconds.
    pub fn runtime_secs(&self) -> f64 {
        self.runtime_ns as f64 / 1_000_000_000.0
    }

    /// CPU share of the given trace span, in percent. `None` if the span is
    /// empty or non-positive.
    pub fn cpu_percent(&self, span_secs: f64) -> Option<f64> {
        if span_secs > 0.0 {
            Some(self.runtime_secs() / span_secs * 100.0)
        } else {
            None
        }
    }
}

/// Kind of a scheduling event on a task timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Task was woken and became runnable.
    Wakeup,
    /// Task was switched onto a CPU.
    SwitchIn,
    /// Task was switched off a CPU.
    SwitchOut,
}

impl EventKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            EventKind::Wakeup => "wakeup",
            EventKind::SwitchIn => "switch-in",
            EventKind::SwitchOut => "switch-out",
        }
    }
}

/// A single pre-extracted scheduling event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Event time in seconds from trace start.
    pub time: f64,
    /// CPU the event was recorded on.
    pub cpu: u32,
    /// Task the event belongs to.
    pub pid: Pid,
    pub kind: EventKind,
}

/// Deterministic per-task series color, cycling a fixed palette by pid.
pub fn task_color(pid: Pid) -> Color32 {
    const PALETTE: &[Color32] = &[
        Color32::from_rgb(0x57, 0x9b, 0xd5),
        Color32::from_rgb(0xde, 0x85, 0x3e),
        Color32::from_rgb(0x6d, 0xbf, 0x6d),
        Color32::from_rgb(0xd5, 0x60, 0x62),
        Color32::from_rgb(0x9a, 0x77, 0xc8),
        Color32::from_rgb(0xc8, 0xb0, 0x5c),
        Color32::from_rgb(0x5c, 0xc8, 0xc0),
        Color32::from_rgb(0xc2, 0x6f, 0xb0),
    ];
    PALETTE[pid as usize % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_label() {
        let id = TaskIdentity::new(1234, "kworker/0:1");
        assert_eq!(id.series_label(), "kworker/0:1:1234");
    }

    #[test]
    fn test_cpu_percent() {
        let mut task = TaskRecord::new(42, "sshd");
        task.runtime_ns = 250_000_000; // 0.25 s
        let pct = task.cpu_percent(10.0).unwrap();
        assert!((pct - 2.5).abs() < 1e-9);
        assert!(task.cpu_percent(0.0).is_none());
    }

    #[test]
    fn test_task_color_is_stable() {
        assert_eq!(task_color(7), task_color(7));
    }
}
