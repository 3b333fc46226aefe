//! Persistent application configuration and state
//!
//! Application state (recent traces, UI preferences) is stored in the
//! platform-appropriate data directory under `dev.tracevis.tracevis-rs` as a
//! TOML file. Trace sessions themselves are separate JSON files opened by the
//! user; see [`crate::trace`].

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceVisError};

/// Application identifier used for the data directory
pub const APP_ID: &str = "dev.tracevis.tracevis-rs";

/// File name for the persisted app state
pub const APP_STATE_FILE: &str = "state.toml";

/// Maximum number of recent traces to remember
pub const MAX_RECENT_TRACES: usize = 10;

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        TraceVisError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            TraceVisError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the app state file
pub fn app_state_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(APP_STATE_FILE))
}

// ==================== Recent Trace Entry ====================

/// Information about a recently opened trace session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentTrace {
    /// Path to the session file
    pub path: PathBuf,

    /// Trace name (from the session metadata)
    pub name: String,

    /// Last opened timestamp (Unix seconds)
    pub last_opened: u64,
}

impl RecentTrace {
    /// Create a new recent trace entry
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            last_opened: unix_now(),
        }
    }

    /// Update the last opened timestamp
    pub fn touch(&mut self) {
        self.last_opened = unix_now();
    }

    /// Check if the session file still exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ==================== App State ====================

/// Persistent application state
///
/// Stores user preferences and history that persist across sessions,
/// separate from the trace files themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppState {
    /// Version for future migration support
    #[serde(default = "default_app_state_version")]
    pub version: u32,

    /// Path to the last opened trace (for restoring the session)
    #[serde(default)]
    pub last_trace_path: Option<PathBuf>,

    /// Recently opened traces
    #[serde(default)]
    pub recent_traces: Vec<RecentTrace>,

    /// UI preferences that persist across traces
    #[serde(default)]
    pub ui_preferences: UiPreferences,
}

fn default_app_state_version() -> u32 {
    1
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            version: 1,
            last_trace_path: None,
            recent_traces: Vec::new(),
            ui_preferences: UiPreferences::default(),
        }
    }
}

impl AppState {
    /// Load app state from the default location
    pub fn load() -> Result<Self> {
        let path = app_state_path().ok_or_else(|| {
            TraceVisError::Config("Could not determine app state path".to_string())
        })?;
        Self::load_from(&path)
    }

    /// Load app state from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| TraceVisError::Config(format!("Failed to read app state: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| TraceVisError::Config(format!("Failed to parse app state: {}", e)))
    }

    /// Load app state, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load app state, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save app state to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(&dir.join(APP_STATE_FILE))
    }

    /// Save app state to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TraceVisError::Config(format!("Failed to serialize app state: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TraceVisError::Config(format!("Failed to write app state: {}", e)))
    }

    /// Add or update a recent trace entry
    pub fn add_recent_trace(&mut self, path: impl AsRef<Path>, name: &str) {
        let path = path.as_ref().to_path_buf();

        // Remove existing entry for this path
        self.recent_traces.retain(|t| t.path != path);

        self.recent_traces
            .insert(0, RecentTrace::new(path.clone(), name));
        self.recent_traces.truncate(MAX_RECENT_TRACES);

        self.last_trace_path = Some(path);
    }

    /// Remove a trace from recents (e.g., if the file was deleted)
    pub fn remove_recent_trace(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.recent_traces.retain(|t| t.path != path);

        if self.last_trace_path.as_deref() == Some(path) {
            self.last_trace_path = None;
        }
    }

    /// Clean up recent traces that no longer exist
    pub fn cleanup_missing_traces(&mut self) {
        self.recent_traces.retain(|t| t.exists());

        if let Some(ref last) = self.last_trace_path {
            if !last.exists() {
                self.last_trace_path = None;
            }
        }
    }

    /// Get the most recent trace path if the file still exists
    pub fn get_last_trace(&self) -> Option<&Path> {
        self.last_trace_path
            .as_deref()
            .filter(|p| p.exists())
    }
}

/// UI preferences that persist across all traces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiPreferences {
    /// Enable dark mode
    #[serde(default = "default_true")]
    pub dark_mode: bool,

    /// Show the legend on the timeline plot
    #[serde(default = "default_true")]
    pub show_legend: bool,

    /// Show grid lines on the timeline plot
    #[serde(default = "default_true")]
    pub show_grid: bool,

    /// Line width for plotted graphs
    #[serde(default = "default_line_width")]
    pub line_width: f32,
}

fn default_true() -> bool {
    true
}

fn default_line_width() -> f32 {
    1.5
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            dark_mode: true,
            show_legend: true,
            show_grid: true,
            line_width: 1.5,
        }
    }
}
