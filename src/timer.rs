use std::time::{Duration, Instant};

use log::info;

/// Stopwatch for "took N ms" log lines.
pub struct Timer{
    start: Instant,
    last: Instant,
}

impl Timer{
    pub fn new() -> Self{
        let start = Instant::now();
        Self{ start, last: start }
    }

    /// Time since the last lap.
    pub fn elapsed(&self) -> Duration{
        self.last.elapsed()
    }

    pub fn total(&self) -> Duration{
        self.start.elapsed()
    }

    /// Logs the time since the previous lap under `label` and starts a new one.
    pub fn lap(&mut self, label: &str) -> Duration{
        let took = self.elapsed();
        info!("{label}: {}ms", took.as_millis());
        self.last = Instant::now();
        took
    }
}

impl Default for Timer{
    fn default() -> Self{
        Self::new()
    }
}
