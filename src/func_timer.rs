use std::time::{Duration, Instant};

use log::{trace, warn};

/// Scoped timer for one frame; logs on drop.
///
/// Frames slower than `budget` are reported at warn level, the rest at trace.
pub struct FunctionTimer {
    name: &'static str,
    budget: Duration,
    start: Instant,
}

impl FunctionTimer {
    pub fn new(name: &'static str, budget: Duration) -> Self {
        FunctionTimer {
            name,
            budget,
            start: Instant::now(),
        }
    }
}

// This `Drop` implementation is called automatically when the `FunctionTimer` struct goes out of scope.
impl Drop for FunctionTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        if duration > self.budget {
            warn!("'{}' took {:?}, over its {:?} budget", self.name, duration, self.budget);
        } else {
            trace!("'{}' took: {:?}", self.name, duration);
        }
    }
}
