use std::io::{self, Write};

use parking_lot::Mutex;

/// Progress output through a lock-guarded shared sink.
///
/// Worker closures run concurrently and share one output stream; every line
/// acquires the sink for exactly the duration of the write, so lines from
/// different workers never interleave. The guard is released when it drops,
/// including on write failure.
pub struct ProgressReporter {
    total: usize,
    interval: usize,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl ProgressReporter {
    /// Report to stderr, one counter line every `interval` files.
    pub fn stderr(total: usize, interval: usize) -> Self {
        Self::with_sink(total, interval, Box::new(io::stderr()))
    }

    /// Report into an arbitrary sink.
    pub fn with_sink(total: usize, interval: usize, sink: Box<dyn Write + Send>) -> Self {
        Self {
            total,
            interval,
            sink: Mutex::new(sink),
        }
    }

    /// Emit a `<index>/<total>` counter line when `index` lands on the
    /// reporting interval. An interval of 0 disables the counter.
    pub fn checkpoint(&self, index: usize) {
        if self.interval > 0 && index % self.interval == 0 {
            let mut sink = self.sink.lock();
            let _ = writeln!(sink, "{}/{}", index, self.total);
        }
    }

    /// Emit one free-form line.
    pub fn note(&self, line: &str) {
        let mut sink = self.sink.lock();
        let _ = writeln!(sink, "{}", line);
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("total", &self.total)
            .field("interval", &self.interval)
            .finish()
    }
}
