//! Trace session model
//!
//! A trace session is the in-memory form of a loaded trace: the task records
//! and the time-ordered scheduling events extracted from it. Raw ftrace/perf
//! decoding is out of scope; sessions are pre-extracted JSON files produced
//! by an external capture step, deserialized here from the bytes the loader
//! delivers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceVisError};
use crate::types::{EventKind, Pid, TaskRecord, TraceEvent};

/// Metadata attached to a captured trace session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceMeta {
    /// Human-readable trace name
    pub name: String,

    /// When the trace was captured
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,

    /// Number of CPUs present in the capture
    pub nr_cpus: u32,
}

/// A fully loaded trace session: tasks plus time-ordered events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSession {
    pub meta: TraceMeta,
    pub tasks: Vec<TaskRecord>,
    pub events: Vec<TraceEvent>,
}

impl TraceSession {
    /// Decode a session from raw file bytes.
    ///
    /// Events are sorted by time on load so that cursor-relative searches can
    /// scan backwards from a partition point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut session: TraceSession = serde_json::from_slice(bytes)
            .map_err(|e| TraceVisError::Session(format!("invalid session file: {}", e)))?;

        if session.meta.nr_cpus == 0 {
            return Err(TraceVisError::Session(
                "session reports zero CPUs".to_string(),
            ));
        }

        session
            .events
            .sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(session)
    }

    /// Build the pid-to-record task map consumed by the selection dialog.
    pub fn task_map(&self) -> BTreeMap<Pid, TaskRecord> {
        self.tasks.iter().map(|t| (t.pid, t.clone())).collect()
    }

    /// Time span covered by the events, as (start, end) in seconds.
    pub fn span(&self) -> (f64, f64) {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => (first.time, last.time),
            _ => (0.0, 0.0),
        }
    }

    /// Length of the covered span in seconds.
    pub fn span_secs(&self) -> f64 {
        let (start, end) = self.span();
        end - start
    }

    /// Locate the latest wakeup of `pid` strictly before `cursor`.
    pub fn find_wakeup(&self, pid: Pid, cursor: f64) -> Option<f64> {
        let upper = self.events.partition_point(|e| e.time < cursor);
        self.events[..upper]
            .iter()
            .rev()
            .find(|e| e.kind == EventKind::Wakeup && e.pid == pid)
            .map(|e| e.time)
    }

    /// CPUs a task was ever scheduled on, ascending.
    pub fn cpus_for(&self, pid: Pid) -> Vec<u32> {
        let mut cpus: Vec<u32> = self
            .events
            .iter()
            .filter(|e| e.pid == pid)
            .map(|e| e.cpu)
            .collect();
        cpus.sort_unstable();
        cpus.dedup();
        cpus
    }
}

/// Event filter restricting the display to a set of tasks.
///
/// Carries the pid-to-pid mapping emitted by the selection dialog's
/// create-filter action. An empty mapping means no filter is active and
/// every pid passes.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    map: BTreeMap<Pid, Pid>,
}

impl EventFilter {
    /// Install a new filter mapping, replacing any previous one.
    pub fn set(&mut self, map: BTreeMap<Pid, Pid>) {
        self.map = map;
    }

    /// Drop the filter; every pid passes again.
    pub fn reset(&mut self) {
        self.map.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.map.is_empty()
    }

    /// Whether events of this pid should be displayed.
    pub fn pass(&self, pid: Pid) -> bool {
        self.map.is_empty() || self.map.contains_key(&pid)
    }

    pub fn pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.map.keys().copied()
    }
}
