use std::time::Instant;

use glam::Vec2;
use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    collision::{
        broadphase::BroadPhase,
        contact::{CollisionInfo, CollisionList},
        narrowphase::NarrowPhase,
        queries::{PointHit, PointQuery},
    },
    config::{WorldSettings, MAX_RESPAWN_ATTEMPTS},
    core::{
        aabb::Aabb,
        body::Body,
        chain::{Chain, ChainAnchor, ChainEnd},
        types::PointMass,
    },
    dynamics::solver::CollisionSolver,
    utils::{
        allocator::{Arena, BodyId, ChainId},
        logging::{check_time_step, ScopedTimer},
        profiling::{PhaseTimer, PhysicsProfiler},
    },
};

mod hooks;
mod stats;

pub use hooks::EventHooks;
pub use stats::StepStats;

/// Central simulation container: owns every body and chain and runs the
/// integrate, cull, detect and resolve pipeline once per [`PhysicsWorld::update`].
#[derive(Debug)]
pub struct PhysicsWorld {
    bodies: Arena<Body>,
    chains: Arena<Chain>,
    collisions: CollisionList,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    solver: CollisionSolver,
    settings: WorldSettings,
    hooks: EventHooks,
    rng: StdRng,
    initialized: bool,
    stats: StepStats,
    profiler: PhysicsProfiler,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self::with_settings(WorldSettings::default())
    }

    pub fn with_settings(settings: WorldSettings) -> Self {
        Self {
            bodies: Arena::new(),
            chains: Arena::new(),
            collisions: Vec::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(settings.same_side_threshold),
            solver: CollisionSolver::from_settings(&settings),
            settings,
            hooks: EventHooks::default(),
            rng: StdRng::seed_from_u64(settings.seed),
            initialized: false,
            stats: StepStats::default(),
            profiler: PhysicsProfiler::default(),
        }
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    /// Replaces the tunables. The random source keeps its state; see [`PhysicsWorld::reseed`].
    pub fn set_settings(&mut self, settings: WorldSettings) {
        self.narrow_phase = NarrowPhase::new(settings.same_side_threshold);
        self.solver = CollisionSolver::from_settings(&settings);
        self.settings = settings;
    }

    pub fn reseed(&mut self, seed: u64) {
        self.settings.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn hooks_mut(&mut self) -> &mut EventHooks {
        &mut self.hooks
    }

    pub fn add_body(&mut self, body: Body) -> BodyId {
        let id = self.bodies.insert(body);
        if let Some(stored) = self.bodies.get_mut(id) {
            stored.id = id;
        }
        id
    }

    /// Removes a body and detaches any chain end that followed it.
    /// Removing an unknown or already removed body is a no-op.
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let body = self.bodies.remove(id)?;
        for chain in self.chains.values_mut() {
            for end in [ChainEnd::Start, ChainEnd::End] {
                if chain.attachment(end).is_some_and(|pm| pm.body == id) {
                    chain.set_attachment(end, None);
                }
            }
        }
        Some(body)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id)
    }

    pub fn bodies(&self) -> &Arena<Body> {
        &self.bodies
    }

    pub fn add_chain(&mut self, chain: Chain) -> ChainId {
        let id = self.chains.insert(chain);
        if let Some(stored) = self.chains.get_mut(id) {
            stored.id = id;
        }
        id
    }

    /// Builds a chain between two anchors. Returns `None` if an anchor refers
    /// to a body or point mass that does not exist.
    pub fn create_chain(
        &mut self,
        start: ChainAnchor,
        end: ChainAnchor,
        links: usize,
        stiffness: f32,
        damping: f32,
        mass: f32,
    ) -> Option<ChainId> {
        let start_mass = self.resolve_anchor(&start)?;
        let end_mass = self.resolve_anchor(&end)?;

        let mut chain = Chain::new(start_mass, end_mass, links, stiffness, damping, mass);
        if let ChainAnchor::Body(point_mass) = start {
            chain.set_attachment(ChainEnd::Start, Some(point_mass));
        }
        if let ChainAnchor::Body(point_mass) = end {
            chain.set_attachment(ChainEnd::End, Some(point_mass));
        }

        Some(self.add_chain(chain))
    }

    fn resolve_anchor(&self, anchor: &ChainAnchor) -> Option<PointMass> {
        match anchor {
            ChainAnchor::Point(point_mass) => Some(*point_mass),
            ChainAnchor::Body(id) => self.bodies.get(id.body)?.point_mass(id.index).copied(),
        }
    }

    pub fn remove_chain(&mut self, id: ChainId) -> Option<Chain> {
        self.chains.remove(id)
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    /// Mutable access to a chain, e.g. to move a free anchor between ticks.
    pub fn chain_mut(&mut self, id: ChainId) -> Option<&mut Chain> {
        self.chains.get_mut(id)
    }

    pub fn chains(&self) -> &Arena<Chain> {
        &self.chains
    }

    /// Collisions found during the last tick.
    pub fn collisions(&self) -> &[CollisionInfo] {
        &self.collisions
    }

    pub fn stats(&self) -> &StepStats {
        &self.stats
    }

    pub fn profiler(&self) -> &PhysicsProfiler {
        &self.profiler
    }

    /// Contacts left unresolved during the last tick because they were too deep.
    pub fn penetration_count(&self) -> usize {
        self.stats.penetration_count()
    }

    pub fn set_world_limits(&mut self, min: Vec2, max: Vec2) {
        self.broad_phase.set_world_limits(min, max);
    }

    pub fn world_bounds(&self) -> &Aabb {
        self.broad_phase.world_bounds()
    }

    pub fn cell_size(&self) -> Vec2 {
        self.broad_phase.cell_size()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Settles static bodies and, unless limits were set explicitly, sizes the
    /// world grid to cover them. Runs once; later calls do nothing.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        for body in self.bodies.values_mut().filter(|body| body.is_static) {
            body.rotate_shape(0.0);
            body.update(0.0);
        }

        if self.broad_phase.has_explicit_limits() {
            return;
        }

        let static_bounds: Vec<Aabb> = self
            .bodies
            .values()
            .filter(|body| body.is_static)
            .map(|body| *body.aabb())
            .collect();
        self.broad_phase.fit_limits(&static_bounds);

        let bounds = self.broad_phase.world_bounds();
        info!(
            "World limits derived from {} static bodies: {:?} .. {:?}",
            static_bounds.len(),
            bounds.min,
            bounds.max
        );
    }

    pub fn is_point_inside_any_body(&self, point: Vec2) -> bool {
        PointQuery::is_inside_any(&self.bodies, point)
    }

    pub fn closest_edge(&self, point: Vec2) -> Option<PointHit> {
        PointQuery::closest_edge(&self.bodies, point)
    }

    /// Teleports every non-static body farther than `far` from `position` to
    /// a random free point between `near` and `far` from it. Returns how many
    /// bodies were moved.
    pub fn move_distant_bodies(&mut self, position: Vec2, near: f32, far: f32) -> usize {
        let distant: Vec<BodyId> = self
            .bodies
            .iter()
            .filter(|(_, body)| !body.is_static && body.position.distance(position) > far)
            .map(|(id, _)| id)
            .collect();

        let mut moved = 0;
        for id in distant {
            let mut target = None;
            for _ in 0..MAX_RESPAWN_ATTEMPTS {
                let candidate = self.random_point_in_ring(position, near, far);
                if !PointQuery::is_inside_any(&self.bodies, candidate) {
                    target = Some(candidate);
                    break;
                }
            }

            let Some(target) = target else {
                warn!(
                    "No free respawn point for body {:?} after {} attempts; leaving it in place",
                    id, MAX_RESPAWN_ATTEMPTS
                );
                continue;
            };

            if let Some(body) = self.bodies.get_mut(id) {
                body.set_position(target);
                body.update(0.0);
                moved += 1;
            }
        }

        moved
    }

    fn random_point_in_ring(&mut self, center: Vec2, near: f32, far: f32) -> Vec2 {
        let direction = Vec2::new(self.rng.random::<f32>() - 0.5, self.rng.random::<f32>() - 0.5).normalize_or_zero();
        let distance = near + (far - near) * self.rng.random::<f32>();
        center + direction * distance
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Negative or non-finite timesteps are rejected with a warning; a zero
    /// timestep still runs detection and resolution.
    pub fn update(&mut self, dt: f64) {
        if !check_time_step(dt) {
            return;
        }
        let dt = dt as f32;
        let _timer = ScopedTimer::new("physics::update");
        let frame_start = Instant::now();

        self.initialize();
        self.profiler.reset();
        self.stats = StepStats::default();
        self.collisions.clear();

        {
            let _timer = ScopedTimer::new("physics::integrate");
            let integrate_start = Instant::now();
            self.integrate_bodies(dt);
            self.update_chains(dt);
            self.profiler.integrate_time += integrate_start.elapsed();
        }

        let pairs = {
            let _timer = ScopedTimer::new("physics::broad_phase");
            let _phase = PhaseTimer::new(&mut self.profiler.broad_phase_time);
            self.broad_phase.find_pairs(&self.bodies, &mut self.stats.broad_phase)
        };

        {
            let _timer = ScopedTimer::new("physics::narrow_phase");
            let _phase = PhaseTimer::new(&mut self.profiler.narrow_phase_time);
            for (id_a, id_b) in pairs {
                let (Some(body_a), Some(body_b)) = (self.bodies.get(id_a), self.bodies.get(id_b)) else {
                    continue;
                };

                self.hooks.aabb_collision(id_a, id_b);
                self.narrow_phase.intersects(body_b, body_a, &mut self.collisions);
                self.narrow_phase.intersects(body_a, body_b, &mut self.collisions);
                self.stats.narrow_phase_tests += 2;
            }
        }

        {
            let _timer = ScopedTimer::new("physics::resolve");
            let _phase = PhaseTimer::new(&mut self.profiler.resolve_time);
            for info in &self.collisions {
                self.hooks.collision(info);
                self.hooks.penetration(info);
                self.solver.resolve_contact(&mut self.bodies, info, &mut self.stats.solver);
            }

            for body in self.bodies.values_mut() {
                body.update_aggregate();
            }
        }

        self.stats.collisions = self.collisions.len();
        self.profiler.body_count = self.bodies.len();
        self.profiler.chain_count = self.chains.len();
        self.profiler.collision_count = self.collisions.len();
        self.profiler.total_frame_time = frame_start.elapsed();
        self.profiler.report();

        debug!(
            "tick dt={dt:.4}: {} bodies, {} collisions, {} unresolved, {} deep",
            self.profiler.body_count,
            self.stats.collisions,
            self.stats.solver.unresolved_penetrations,
            self.stats.solver.deep_contacts
        );
    }

    fn integrate_bodies(&mut self, dt: f32) {
        let gravity = self.settings.gravity;
        for body in self.bodies.values_mut() {
            if !body.is_static && gravity != Vec2::ZERO {
                let mass = body.mean_mass();
                if mass.is_finite() {
                    body.force += gravity * mass;
                }
            }
            body.update(dt);
            self.broad_phase.update_bitmasks(body);
        }
    }

    /// Steps every chain, keeping attached ends glued to their body point
    /// masses and handing the chain's pull back to those point masses.
    fn update_chains(&mut self, dt: f32) {
        for chain in self.chains.values_mut() {
            for end in [ChainEnd::Start, ChainEnd::End] {
                let Some(id) = chain.attachment(end) else {
                    continue;
                };
                match self.bodies.get(id.body).and_then(|body| body.point_mass(id.index)) {
                    Some(point_mass) => chain.set_anchor(end, point_mass.position, point_mass.velocity),
                    None => chain.set_attachment(end, None),
                }
            }

            chain.update(dt);

            for end in [ChainEnd::Start, ChainEnd::End] {
                let Some(id) = chain.attachment(end) else {
                    continue;
                };
                let pull = chain.take_anchor_force(end);
                if let Some(body) = self.bodies.get_mut(id.body).filter(|body| !body.is_static) {
                    if let Some(point_mass) = body.point_mass_mut(id.index) {
                        point_mass.force += pull;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shape::Shape;
    use crate::utils::allocator::PointMassId;

    fn ground(world: &mut PhysicsWorld) -> BodyId {
        world.add_body(
            Body::builder(Shape::rectangle(20.0, 2.0))
                .position(Vec2::new(0.0, -1.0))
                .static_body()
                .build(),
        )
    }

    #[test]
    fn initialize_derives_limits_from_static_bodies() {
        let mut world = PhysicsWorld::new();
        ground(&mut world);
        world.initialize();

        let bounds = world.world_bounds();
        assert_eq!(bounds.min, Vec2::new(-10.0, -2.0));
        assert_eq!(bounds.max, Vec2::new(10.0, 0.0));
        assert!(world.is_initialized());
    }

    #[test]
    fn explicit_limits_survive_initialize() {
        let mut world = PhysicsWorld::new();
        ground(&mut world);
        world.set_world_limits(Vec2::splat(-100.0), Vec2::splat(100.0));
        world.update(1.0 / 60.0);

        assert_eq!(world.world_bounds().max, Vec2::splat(100.0));
        assert_eq!(world.cell_size(), Vec2::splat(200.0 / 32.0));
    }

    #[test]
    fn invalid_timestep_is_skipped() {
        let mut world = PhysicsWorld::new();
        world.update(-1.0);
        world.update(f64::NAN);
        assert!(!world.is_initialized());
    }

    #[test]
    fn removing_twice_is_a_no_op() {
        let mut world = PhysicsWorld::new();
        let id = ground(&mut world);
        assert!(world.remove_body(id).is_some());
        assert!(world.remove_body(id).is_none());
        assert!(world.body(id).is_none());
    }

    #[test]
    fn gravity_accelerates_free_bodies_only() {
        let settings = WorldSettings::default().with_gravity(Vec2::new(0.0, -10.0));
        let mut world = PhysicsWorld::with_settings(settings);
        let floor = ground(&mut world);
        let ball = world.add_body(
            Body::builder(Shape::rectangle(1.0, 1.0))
                .position(Vec2::new(0.0, 50.0))
                .build(),
        );

        for _ in 0..10 {
            world.update(1.0 / 60.0);
        }

        assert!(world.body(ball).unwrap().velocity.y < 0.0);
        assert_eq!(world.body(floor).unwrap().position, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn chain_follows_and_pulls_attached_body() {
        let mut world = PhysicsWorld::new();
        world.set_world_limits(Vec2::splat(-50.0), Vec2::splat(50.0));
        let weight = world.add_body(
            Body::builder(Shape::rectangle(1.0, 1.0))
                .position(Vec2::new(0.0, -8.0))
                .build(),
        );

        let chain = world
            .create_chain(
                ChainAnchor::Point(PointMass::anchor(Vec2::ZERO)),
                ChainAnchor::Body(PointMassId::new(weight, 0)),
                4,
                50.0,
                1.0,
                0.5,
            )
            .unwrap();

        world.body_mut(weight).unwrap().set_velocity(Vec2::new(0.0, -5.0));
        for _ in 0..30 {
            world.update(1.0 / 60.0);
        }

        let attached = world.body(weight).unwrap().point_masses()[0].position;
        let anchor = world.chain(chain).unwrap().anchor(ChainEnd::End).position;
        assert!(attached.distance(anchor) < 0.5);
        assert!(world.body(weight).unwrap().velocity.y > -5.0);

        world.remove_body(weight);
        assert!(world.chain(chain).unwrap().attachment(ChainEnd::End).is_none());
    }

    #[test]
    fn moved_free_anchor_drags_the_chain() {
        let mut world = PhysicsWorld::new();
        let chain = world
            .create_chain(
                ChainAnchor::Point(PointMass::anchor(Vec2::ZERO)),
                ChainAnchor::Point(PointMass::anchor(Vec2::new(4.0, 0.0))),
                4,
                50.0,
                1.0,
                0.5,
            )
            .unwrap();
        world.update(1.0 / 60.0);

        world
            .chain_mut(chain)
            .unwrap()
            .set_anchor(ChainEnd::End, Vec2::new(4.0, -3.0), Vec2::ZERO);
        for _ in 0..240 {
            world.update(1.0 / 60.0);
        }

        let chain = world.chain(chain).unwrap();
        assert_eq!(chain.anchor(ChainEnd::End).position, Vec2::new(4.0, -3.0));
        let interior = &chain.point_masses()[1..4];
        assert!(interior.iter().all(|pm| pm.position.y < 0.0));
        assert!((interior[1].position.y + 1.5).abs() < 0.3, "middle at {:?}", interior[1].position);
    }

    #[test]
    fn world_state_is_debug_printable() {
        let mut world = PhysicsWorld::new();
        ground(&mut world);
        world.add_chain(Chain::new(
            PointMass::anchor(Vec2::ZERO),
            PointMass::anchor(Vec2::ONE),
            2,
            10.0,
            0.0,
            1.0,
        ));

        let printed = format!("{world:?}");
        assert!(printed.starts_with("PhysicsWorld"));
        assert!(printed.contains("bodies"));
    }

    #[test]
    fn create_chain_rejects_unknown_body() {
        let mut world = PhysicsWorld::new();
        let id = ground(&mut world);
        world.remove_body(id);

        let chain = world.create_chain(
            ChainAnchor::Body(PointMassId::new(id, 0)),
            ChainAnchor::Point(PointMass::anchor(Vec2::ONE)),
            2,
            1.0,
            0.0,
            1.0,
        );
        assert!(chain.is_none());
    }
}
