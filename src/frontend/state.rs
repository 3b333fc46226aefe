//! Shared action types for the frontend
//!
//! Panels and dialogs never mutate the plot or the trace model directly.
//! They return `AppAction` values which the app applies centrally, keeping
//! dispatch logic testable without a running UI.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::types::Pid;

/// Actions that any panel or dialog can emit
///
/// The first five variants carry exactly the payloads of the task-keyed
/// requests the original selection widgets emit; the rest drive the
/// application shell.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    // Task-keyed requests
    /// Create a persistent unified graph for this task
    AddTaskGraph(Pid),
    /// Destroy the persistent unified graph for this task
    RemoveTaskGraph(Pid),
    /// Register this task's graph in the shared legend
    AddToLegend(Pid),
    /// Locate the preceding wakeup of this task relative to the active cursor
    FindWakeup(Pid),
    /// Restrict the event display to these tasks
    CreateFilter(BTreeMap<Pid, Pid>),
    /// Drop the active event filter
    ResetFilter,

    // Shell actions
    /// Load a trace session file
    OpenTrace(PathBuf),
    /// Close the current trace session
    CloseTrace,
    /// Remove every unified graph and clear the legend
    ClearAllGraphs,
    /// Open a dialog
    OpenDialog(DialogId),
}

/// Dialog identifiers
///
/// Used with `AppAction::OpenDialog` to specify which dialog to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogId {
    /// Task selection table
    TaskSelect,
}
