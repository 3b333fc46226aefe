//! End-to-end session loading: file -> loader buffers -> decoded session

use std::io::Write;

use anyhow::Result;

use tracevis_rs::loader;
use tracevis_rs::trace::TraceSession;
use tracevis_rs::types::EventKind;

fn sample_json() -> String {
    serde_json::json!({
        "meta": { "name": "boot", "nr_cpus": 2 },
        "tasks": [
            { "pid": 0, "name": "swapper", "runtime_ns": 900_000_000u64 },
            { "pid": 7, "name": "irq/7-sched", "runtime_ns": 50_000_000u64 },
            { "pid": 42, "name": "sshd", "runtime_ns": 125_000_000u64 }
        ],
        "events": [
            { "time": 0.50, "cpu": 0, "pid": 7, "kind": "wakeup" },
            { "time": 0.10, "cpu": 0, "pid": 7, "kind": "wakeup" },
            { "time": 0.12, "cpu": 0, "pid": 7, "kind": "switch_in" },
            { "time": 0.20, "cpu": 1, "pid": 42, "kind": "wakeup" },
            { "time": 0.30, "cpu": 0, "pid": 7, "kind": "switch_out" }
        ]
    })
    .to_string()
}

#[test]
fn load_and_decode_session_file() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(sample_json().as_bytes())?;
    file.flush()?;

    let bytes = loader::read_all(file.path())?;
    let session = TraceSession::from_bytes(&bytes)?;

    assert_eq!(session.meta.name, "boot");
    assert_eq!(session.tasks.len(), 3);
    assert_eq!(session.events.len(), 5);

    // Events come out time-ordered regardless of file order
    let times: Vec<f64> = session.events.iter().map(|e| e.time).collect();
    assert_eq!(times, vec![0.10, 0.12, 0.20, 0.30, 0.50]);

    // Wakeup search sees the sorted order
    assert_eq!(session.find_wakeup(7, 0.60), Some(0.50));
    assert_eq!(session.find_wakeup(7, 0.40), Some(0.10));

    let map = session.task_map();
    assert_eq!(map.get(&42).map(|t| t.name.as_str()), Some("sshd"));

    assert!(session
        .events
        .iter()
        .any(|e| e.kind == EventKind::SwitchOut));
    Ok(())
}

#[test]
fn corrupt_file_reports_session_error() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(b"{ \"meta\": truncated")?;
    file.flush()?;

    let bytes = loader::read_all(file.path())?;
    let err = TraceSession::from_bytes(&bytes).unwrap_err();
    assert!(err.to_string().contains("Session error"));
    Ok(())
}
