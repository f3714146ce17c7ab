use log::{log_enabled, warn, Level};
use std::time::Instant;

/// Simple scoped timer tracing the duration of a simulation phase.
pub struct ScopedTimer<'a> {
    label: &'a str,
    start: Instant,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'a str) -> Self {
        if log_enabled!(Level::Trace) {
            log::trace!("start {label}");
        }
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl<'a> Drop for ScopedTimer<'a> {
    fn drop(&mut self) {
        if log_enabled!(Level::Trace) {
            let elapsed = self.start.elapsed();
            log::trace!("end {} ({} µs)", self.label, elapsed.as_micros());
        }
    }
}

/// Returns false (and warns) when a timestep cannot advance the simulation.
pub fn check_time_step(dt: f64) -> bool {
    if dt.is_finite() && dt >= 0.0 {
        true
    } else {
        warn!("Skipping physics tick with invalid timestep {dt}");
        false
    }
}
