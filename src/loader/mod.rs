//! Background trace file loader
//!
//! A [`LoadThread`] is constructed with a fixed pool of pre-allocated
//! [`LoadBuffer`]s and a file handle. It fills one buffer at a time and hands
//! each filled buffer to the consumer over a bounded crossbeam channel,
//! recycling empties from a return channel. The thread carries no retry or
//! backpressure logic of its own; the bounded pool is the only throttle.
//! Results travel through the buffers themselves, not return values.
//!
//! Dropping the consumer's receiver ends the thread at its next send.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::error::{Result, TraceVisError};

/// Default number of pre-allocated buffers in the pool
pub const DEFAULT_BUFFER_COUNT: usize = 4;

/// Capacity of each load buffer in bytes
pub const BUFFER_CAPACITY: usize = 256 * 1024;

/// A pre-allocated, reusable chunk of loaded file data
#[derive(Debug)]
pub struct LoadBuffer {
    data: Vec<u8>,
    len: usize,
}

impl LoadBuffer {
    /// Allocate an empty buffer with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            len: 0,
        }
    }

    /// The filled portion of the buffer
    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Mark the buffer empty for reuse
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Fill from a reader until the buffer is full or the reader hits EOF.
    /// Returns the number of bytes now held.
    fn fill(&mut self, reader: &mut impl Read) -> std::io::Result<usize> {
        self.len = 0;
        while self.len < self.data.len() {
            match reader.read(&mut self.data[self.len..]) {
                Ok(0) => break,
                Ok(n) => self.len += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(self.len)
    }
}

/// Handle to the background loader thread
pub struct LoadThread {
    path: PathBuf,
    handle: JoinHandle<Result<u64>>,
}

impl LoadThread {
    /// Spawn a loader for `path` with a pool of `n_buffers` pre-allocated
    /// buffers.
    ///
    /// Returns the thread handle, the receiver of filled buffers, and the
    /// sender used to recycle drained buffers back into the pool. The filled
    /// channel closes once the whole file has been delivered.
    pub fn spawn(
        path: impl AsRef<Path>,
        n_buffers: usize,
    ) -> Result<(Self, Receiver<LoadBuffer>, Sender<LoadBuffer>)> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path)?;

        let (filled_tx, filled_rx) = bounded::<LoadBuffer>(n_buffers);
        let (recycle_tx, recycle_rx) = bounded::<LoadBuffer>(n_buffers);

        for _ in 0..n_buffers {
            recycle_tx
                .send(LoadBuffer::new(BUFFER_CAPACITY))
                .map_err(|_| TraceVisError::Channel("buffer pool closed".to_string()))?;
        }

        let thread_path = path.clone();
        let handle = std::thread::Builder::new()
            .name("trace-loader".to_string())
            .spawn(move || -> Result<u64> {
                let mut total: u64 = 0;
                loop {
                    let mut buffer = match recycle_rx.recv() {
                        Ok(b) => b,
                        // Consumer dropped its recycle sender: stop early
                        Err(_) => break,
                    };

                    let n = buffer.fill(&mut file)?;
                    if n == 0 {
                        break;
                    }
                    total += n as u64;

                    if filled_tx.send(buffer).is_err() {
                        // Consumer went away
                        break;
                    }
                }
                tracing::debug!(path = %thread_path.display(), total, "loader finished");
                Ok(total)
            })
            .map_err(|e| TraceVisError::Load(format!("failed to spawn loader: {}", e)))?;

        Ok((Self { path, handle }, filled_rx, recycle_tx))
    }

    /// Path being loaded
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for the thread and return the number of bytes delivered
    pub fn join(self) -> Result<u64> {
        self.handle
            .join()
            .map_err(|_| TraceVisError::Load("loader thread panicked".to_string()))?
    }
}

/// Read a whole file through the buffer pool, preserving delivery order.
pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let (thread, filled_rx, recycle_tx) = LoadThread::spawn(path, DEFAULT_BUFFER_COUNT)?;

    let mut out = Vec::new();
    for mut buffer in filled_rx.iter() {
        out.extend_from_slice(buffer.bytes());
        buffer.clear();
        // The loader may already be done; a failed recycle is fine
        let _ = recycle_tx.send(buffer);
    }
    drop(recycle_tx);

    let total = thread.join()?;
    if total != out.len() as u64 {
        return Err(TraceVisError::Load(format!(
            "delivered {} bytes but consumed {}",
            total,
            out.len()
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(bytes).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn test_read_all_small_file() {
        let f = write_temp(b"hello trace");
        let bytes = read_all(f.path()).unwrap();
        assert_eq!(bytes, b"hello trace");
    }

    #[test]
    fn test_read_all_empty_file() {
        let f = write_temp(b"");
        let bytes = read_all(f.path()).unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_read_all_larger_than_pool() {
        // Spans multiple buffer refills: pool holds 4 * 256 KiB
        let payload: Vec<u8> = (0..3 * BUFFER_CAPACITY + 17)
            .map(|i| (i % 251) as u8)
            .collect();
        let f = write_temp(&payload);
        let bytes = read_all(f.path()).unwrap();
        assert_eq!(bytes, payload);
    }

    #[test]
    fn test_spawn_missing_file() {
        assert!(LoadThread::spawn("/definitely/not/here.json", 2).is_err());
    }

    #[test]
    fn test_dropping_receiver_stops_thread() {
        let payload = vec![7u8; 8 * BUFFER_CAPACITY];
        let f = write_temp(&payload);
        let (thread, filled_rx, recycle_tx) = LoadThread::spawn(f.path(), 2).unwrap();

        // Take one buffer then walk away
        let first = filled_rx.recv().unwrap();
        assert!(!first.bytes().is_empty());
        drop(filled_rx);
        drop(recycle_tx);

        // The thread must terminate rather than block forever
        thread.join().unwrap();
    }
}
