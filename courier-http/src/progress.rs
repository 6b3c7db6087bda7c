//! Download progress reporting.

use std::io::{self, Read};
use std::sync::Arc;

/// Receives progress updates while a response body is read.
pub trait ProgressMonitor: Send + Sync {
    /// Called after each chunk. `total_bytes` is 0 when the server sent no
    /// `Content-Length`.
    fn accept(&self, field: &str, file_name: &str, bytes_written: u64, total_bytes: u64);
}

impl<F> ProgressMonitor for F
where
    F: Fn(&str, &str, u64, u64) + Send + Sync,
{
    fn accept(&self, field: &str, file_name: &str, bytes_written: u64, total_bytes: u64) {
        self(field, file_name, bytes_written, total_bytes)
    }
}

/// Reader that reports every chunk to a monitor.
pub(crate) struct MonitoredReader<R> {
    inner: R,
    monitor: Arc<dyn ProgressMonitor>,
    file_name: String,
    written: u64,
    total: u64,
}

impl<R: Read> MonitoredReader<R> {
    pub(crate) fn new(
        inner: R,
        monitor: Arc<dyn ProgressMonitor>,
        file_name: impl Into<String>,
        total: u64,
    ) -> Self {
        Self {
            inner,
            monitor,
            file_name: file_name.into(),
            written: 0,
            total,
        }
    }
}

impl<R: Read> Read for MonitoredReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.written += n as u64;
            self.monitor
                .accept("body", &self.file_name, self.written, self.total);
        }
        Ok(n)
    }
}
