//! Kernel Trace Visualizer - Main Entry Point

use tracevis_rs::config::{self, AppState};
use tracevis_rs::frontend::TraceVisApp;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> eframe::Result<()> {
    let _log_guard = init_logging();

    tracing::info!("Starting TraceVis");

    // Load application state (recent traces, preferences)
    let mut app_state = AppState::load_or_default();
    app_state.cleanup_missing_traces();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("TraceVis"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "TraceVis",
        native_options,
        Box::new(|cc| Ok(Box::new(TraceVisApp::new(cc, app_state)))),
    );

    tracing::info!("Shutting down...");
    result
}

/// Initialize logging: stderr always, plus a daily-rolled file in the app
/// data directory when one is available. The returned guard must stay alive
/// for the file writer to flush.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tracevis_rs=debug"))
    };

    let log_dir = config::app_data_dir().map(|d| d.join("logs"));
    let log_dir = match log_dir {
        Some(dir) if std::fs::create_dir_all(&dir).is_ok() => Some(dir),
        _ => None,
    };

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "tracevis.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(env_filter())
                .with(tracing_subscriber::fmt::layer())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(tracing_subscriber::fmt::layer())
                .init();
            None
        }
    }
}
