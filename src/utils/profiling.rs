use std::time::{Duration, Instant};

/// Frame timing and counters gathered by [`crate::PhysicsWorld::update`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PhysicsProfiler {
    pub integrate_time: Duration,
    pub broad_phase_time: Duration,
    pub narrow_phase_time: Duration,
    pub resolve_time: Duration,
    pub total_frame_time: Duration,

    pub body_count: usize,
    pub chain_count: usize,
    pub collision_count: usize,
}

impl PhysicsProfiler {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn report(&self) {
        let total_us = self.total_frame_time.as_micros() as f32;
        if total_us < 1.0 {
            return;
        }

        let share = |d: Duration| (d.as_micros() as f32 / total_us) * 100.0;

        log::debug!(
            "physics frame {:.2} ms: bodies {}, chains {}, collisions {}",
            self.total_frame_time.as_secs_f32() * 1000.0,
            self.body_count,
            self.chain_count,
            self.collision_count
        );
        log::debug!(
            "  integrate {:.1}% | broad {:.1}% | narrow {:.1}% | resolve {:.1}%",
            share(self.integrate_time),
            share(self.broad_phase_time),
            share(self.narrow_phase_time),
            share(self.resolve_time)
        );
    }
}

/// Adds the lifetime of the guard to a duration slot.
pub struct PhaseTimer<'a> {
    start: Instant,
    output: &'a mut Duration,
}

impl<'a> PhaseTimer<'a> {
    pub fn new(output: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            output,
        }
    }
}

impl<'a> Drop for PhaseTimer<'a> {
    fn drop(&mut self) {
        *self.output += self.start.elapsed();
    }
}
