use crate::{collision::broadphase::BroadPhaseStats, dynamics::solver::SolverStepMetrics};

/// Counters gathered during the most recent tick.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StepStats {
    pub broad_phase: BroadPhaseStats,
    /// Directed narrow-phase runs; every surviving pair is tested both ways.
    pub narrow_phase_tests: usize,
    pub collisions: usize,
    pub solver: SolverStepMetrics,
}

impl StepStats {
    /// Contacts too deep to resolve this tick.
    pub fn penetration_count(&self) -> usize {
        self.solver.unresolved_penetrations
    }
}
