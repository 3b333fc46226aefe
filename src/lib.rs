//! # TraceVis-RS: Kernel Trace Visualizer
//!
//! A desktop tool for visualizing kernel trace data (ftrace/perf) as
//! per-task timeline graphs with an interactive legend, a task selection
//! dialog, and a focused-task info panel.
//!
//! ## Architecture
//!
//! - **Loader**: Fills a pool of pre-allocated buffers from the trace file in
//!   a background thread
//! - **Trace**: In-memory session model (tasks + time-ordered scheduling
//!   events) with wakeup search and event filtering
//! - **Frontend**: eframe/egui shell with egui_plot timelines; panels and
//!   dialogs return `AppAction`s that the app applies centrally
//! - **Communication**: Crossbeam channels between the loader and the UI
//!
//! ## Configuration
//!
//! Application state (recent traces, preferences) is stored in the
//! platform-appropriate data directory under `dev.tracevis.tracevis-rs`:
//!
//! - **Linux**: `~/.local/share/dev.tracevis.tracevis-rs/`
//! - **macOS**: `~/Library/Application Support/dev.tracevis.tracevis-rs/`
//! - **Windows**: `%APPDATA%\dev.tracevis.tracevis-rs\`
//!
//! ## Example
//!
//! ```ignore
//! use tracevis_rs::{config::AppState, frontend::TraceVisApp};
//!
//! fn main() -> eframe::Result<()> {
//!     let mut app_state = AppState::load_or_default();
//!     app_state.cleanup_missing_traces();
//!
//!     eframe::run_native(
//!         "TraceVis",
//!         eframe::NativeOptions::default(),
//!         Box::new(|cc| Ok(Box::new(TraceVisApp::new(cc, app_state)))),
//!     )
//! }
//! ```

pub mod config;
pub mod error;
pub mod frontend;
pub mod loader;
pub mod trace;
pub mod types;

// Re-export commonly used types
pub use config::AppState;
pub use error::{Result, TraceVisError};
pub use frontend::{AppAction, LegendMembership, TaskInfoPanel, TraceVisApp};
pub use trace::{EventFilter, TraceSession};
pub use types::{EventKind, Pid, TaskIdentity, TaskRecord, TraceEvent};
