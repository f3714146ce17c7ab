use std::f32::consts::PI;

use glam::Vec2;

use crate::{
    collision::bitmask::Bitmask,
    config::{DEFAULT_BODY_DAMPING, EDGE_EPSILON},
    dynamics::{
        forces::{BodyKind, PressureModel, SpringModel},
        integrator::Integrator,
    },
    utils::{
        allocator::BodyId,
        math::{signed_angle, wrap_angle_delta},
    },
};

use super::{aabb::Aabb, shape::Shape, spring::Spring, types::PointMass};

/// Projection of a point onto one polygon edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeProjection {
    /// Closest point on the edge.
    pub point: Vec2,
    /// Outward edge normal.
    pub normal: Vec2,
    /// Position along the edge in `[0, 1]`, 0 at the start point.
    pub edge_distance: f32,
    /// Distance to the edge (squared for the `_squared` queries).
    pub distance: f32,
}

/// Closest edge of a body to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestEdge {
    pub start: usize,
    pub end: usize,
    pub projection: EdgeProjection,
}

/// A deformable polygon driven by one point mass per vertex.
///
/// Position, velocity and force are the means over the point masses. Writing
/// them (and marking the body dirty) translates every point mass so that the
/// new aggregate is reached at the next [`Body::update`].
#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub force: Vec2,
    pub angle: f32,
    pub omega: f32,
    pub scale: Vec2,
    pub damping: f32,
    pub is_static: bool,
    pub is_dirty: bool,
    pub is_merging: bool,
    pub bitmask_x: Bitmask,
    pub bitmask_y: Bitmask,
    base_shape: Shape,
    current_shape: Vec<Vec2>,
    point_masses: Vec<PointMass>,
    aabb: Aabb,
    kind: BodyKind,
}

impl Body {
    /// Rigid body with every point mass weighing `mass`.
    ///
    /// The base shape is recentered on its centroid; `position` places that
    /// centroid in the world. `shape` must be a closed polygon of at least 3
    /// points, as produced by [`Shape::end`]; edge queries index modulo the
    /// point count.
    pub fn new(shape: &Shape, mass: f32, position: Vec2, angle: f32, scale: Vec2) -> Self {
        debug_assert!(shape.count() >= 3, "body shape needs at least 3 points, got {}", shape.count());

        let mut base_shape = shape.clone();
        base_shape.center_at_zero();

        let current_shape = Shape::transform(base_shape.points(), position, angle, scale);
        let point_masses = current_shape
            .iter()
            .map(|&p| PointMass::new(p, mass))
            .collect();

        let mut body = Self {
            id: BodyId::default(),
            position,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            angle,
            omega: 0.0,
            scale,
            damping: DEFAULT_BODY_DAMPING,
            is_static: false,
            is_dirty: true,
            is_merging: false,
            bitmask_x: Bitmask::new(),
            bitmask_y: Bitmask::new(),
            base_shape,
            current_shape,
            point_masses,
            aabb: Aabb::empty(),
            kind: BodyKind::Rigid,
        };
        body.update_aggregate();
        body.update_aabb(0.0);
        body
    }

    pub fn builder(shape: Shape) -> BodyBuilder {
        BodyBuilder::new(shape)
    }

    pub fn base_shape(&self) -> &Shape {
        &self.base_shape
    }

    pub fn current_shape(&self) -> &[Vec2] {
        &self.current_shape
    }

    pub fn point_masses(&self) -> &[PointMass] {
        &self.point_masses
    }

    pub fn point_masses_mut(&mut self) -> &mut [PointMass] {
        &mut self.point_masses
    }

    pub fn point_mass(&self, index: usize) -> Option<&PointMass> {
        self.point_masses.get(index)
    }

    pub fn point_mass_mut(&mut self, index: usize) -> Option<&mut PointMass> {
        self.point_masses.get_mut(index)
    }

    pub fn count(&self) -> usize {
        self.point_masses.len()
    }

    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    pub fn kind(&self) -> &BodyKind {
        &self.kind
    }

    /// Enclosed volume of a pressure body as of its last update.
    pub fn volume(&self) -> Option<f32> {
        self.kind.pressure().map(PressureModel::volume)
    }

    /// Mean of the finite point masses, or infinity if every point is immovable.
    pub fn mean_mass(&self) -> f32 {
        let (sum, count) = self
            .point_masses
            .iter()
            .filter(|pm| !pm.is_immovable())
            .fold((0.0, 0usize), |(sum, count), pm| (sum + pm.mass, count + 1));
        if count == 0 {
            f32::INFINITY
        } else {
            sum / count as f32
        }
    }

    pub fn total_momentum(&self) -> Vec2 {
        self.point_masses.iter().map(PointMass::momentum).sum()
    }

    /// Moves the body; takes effect at the next update.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.is_dirty = true;
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
        self.is_dirty = true;
    }

    /// Adds to the force every point mass receives at the next update.
    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
        self.is_dirty = true;
    }

    /// Pushes the body at a world `point`. Besides the uniform share of
    /// `force`, every point mass receives a tangential force proportional to
    /// the torque about the body centre, so an off-centre push spins the body.
    pub fn apply_force_at(&mut self, point: Vec2, force: Vec2) {
        let torque = (self.position - point).perp_dot(force);
        for point_mass in &mut self.point_masses {
            let tangent = -(point_mass.position - self.position).perp();
            point_mass.force += tangent * torque;
        }
        self.apply_force(force);
    }

    /// Connects two point masses of a spring or pressure body at their
    /// current separation. Returns the new spring's index.
    pub fn add_internal_spring(&mut self, a: usize, b: usize, stiffness: f32, damping: f32) -> Option<usize> {
        if a >= self.point_masses.len() || b >= self.point_masses.len() || a == b {
            return None;
        }
        let spring = Spring::new(&self.point_masses, a, b, stiffness, damping);
        let springs = self.kind.springs_mut()?;
        springs.add_spring(spring);
        Some(springs.springs.len() - 1)
    }

    pub fn update(&mut self, dt: f32) {
        if !self.is_dirty || self.is_merging {
            return;
        }

        self.snap_point_masses();
        self.rotate_shape(dt);
        self.kind.apply(&mut self.point_masses, &self.current_shape);
        Integrator::new(self.damping).step_all(&mut self.point_masses, dt);
        self.update_aabb(dt);
        self.update_aggregate();

        if self.is_static {
            self.is_dirty = false;
        }
    }

    /// Shifts the point masses so that their means match the body's
    /// position, velocity and force.
    fn snap_point_masses(&mut self) {
        let count = self.point_masses.len() as f32;
        if count == 0.0 {
            return;
        }

        let (position, velocity, force) = self.point_mass_means();
        let position_offset = self.position - position;
        let velocity_offset = self.velocity - velocity;
        let force_offset = self.force - force;

        for point_mass in &mut self.point_masses {
            point_mass.position += position_offset;
            point_mass.velocity += velocity_offset;
            point_mass.force += force_offset;
        }
    }

    fn point_mass_means(&self) -> (Vec2, Vec2, Vec2) {
        let count = self.point_masses.len().max(1) as f32;
        let (position, velocity, force) = self.point_masses.iter().fold(
            (Vec2::ZERO, Vec2::ZERO, Vec2::ZERO),
            |(p, v, f), pm| (p + pm.position, v + pm.velocity, f + pm.force),
        );
        (position / count, velocity / count, force / count)
    }

    /// Recomputes position, velocity and force from the point masses.
    pub fn update_aggregate(&mut self) {
        let (position, velocity, force) = self.point_mass_means();
        self.position = position;
        self.velocity = velocity;
        self.force = force;
    }

    /// Swept bounds: current positions plus positions extrapolated by `dt`.
    pub fn update_aabb(&mut self, dt: f32) {
        self.aabb.clear();
        for point_mass in &self.point_masses {
            self.aabb.extend(point_mass.position);
            self.aabb.extend(point_mass.position + point_mass.velocity * dt);
        }
    }

    /// Fits a single rotation to the point masses and rebuilds the current
    /// shape from the base shape at that rotation.
    pub fn rotate_shape(&mut self, dt: f32) {
        let mut angle_sum = 0.0;
        let mut reference_sign = 1.0;
        let mut reference_angle = 0.0;

        for (i, (&base, point_mass)) in self
            .base_shape
            .points()
            .iter()
            .zip(&self.point_masses)
            .enumerate()
        {
            let base_dir = base.normalize_or_zero();
            let current_dir = (point_mass.position - self.position).normalize_or_zero();

            let mut angle = signed_angle(base_dir, current_dir);
            let sign = if angle >= 0.0 { 1.0 } else { -1.0 };

            if i == 0 {
                reference_sign = sign;
                reference_angle = angle;
            } else if (angle - reference_angle).abs() > PI && sign != reference_sign {
                angle = if sign < 0.0 {
                    PI + (PI + angle)
                } else {
                    (PI - angle) - PI
                };
            }

            angle_sum += angle;
        }

        let count = self.point_masses.len().max(1) as f32;
        let angle = angle_sum / count;

        let delta = wrap_angle_delta(angle - self.angle);
        self.omega = if dt > 0.0 { delta / dt } else { 0.0 };
        self.angle = angle;

        self.current_shape = Shape::transform(self.base_shape.points(), self.position, angle, self.scale);
    }

    /// Even-odd ray cast towards +x against the point-mass polygon.
    pub fn contains(&self, point: Vec2) -> bool {
        let max_x = if self.aabb.is_valid() {
            self.aabb.max.x
        } else {
            self.point_masses
                .iter()
                .map(|pm| pm.position.x)
                .fold(f32::NEG_INFINITY, f32::max)
        };
        let end_x = max_x + 0.1;

        let count = self.point_masses.len();
        let mut inside = false;

        for i in 0..count {
            let a = self.point_masses[i].position;
            let b = self.point_masses[(i + 1) % count].position;

            let crosses = (a.y <= point.y && b.y > point.y) || (a.y > point.y && b.y <= point.y);
            if !crosses {
                continue;
            }

            let hit_x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if hit_x >= point.x && hit_x <= end_x {
                inside = !inside;
            }
        }

        inside
    }

    /// Projects `point` onto the edge starting at point mass `edge`.
    pub fn closest_point_on_edge(&self, point: Vec2, edge: usize) -> EdgeProjection {
        let mut projection = self.closest_point_on_edge_squared(point, edge);
        projection.distance = projection.distance.sqrt();
        projection
    }

    pub fn closest_point_on_edge_squared(&self, point: Vec2, edge: usize) -> EdgeProjection {
        let count = self.point_masses.len();
        let start = self.point_masses[edge % count].position;
        let end = self.point_masses[(edge + 1) % count].position;
        project_on_edge(point, start, end)
    }

    /// Closest edge of the whole polygon to `point`.
    pub fn closest_point(&self, point: Vec2) -> Option<ClosestEdge> {
        let count = self.point_masses.len();
        (0..count)
            .map(|start| ClosestEdge {
                start,
                end: (start + 1) % count,
                projection: self.closest_point_on_edge_squared(point, start),
            })
            .min_by(|a, b| a.projection.distance.total_cmp(&b.projection.distance))
            .map(|mut closest| {
                closest.projection.distance = closest.projection.distance.sqrt();
                closest
            })
    }

    /// Index of and distance to the nearest point mass.
    pub fn closest_point_mass(&self, point: Vec2) -> Option<(usize, f32)> {
        self.point_masses
            .iter()
            .enumerate()
            .map(|(i, pm)| (i, pm.position.distance_squared(point)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, d)| (i, d.sqrt()))
    }
}

/// Squared-distance projection of `point` onto the segment `start -> end`.
pub fn project_on_edge(point: Vec2, start: Vec2, end: Vec2) -> EdgeProjection {
    let to_point = point - start;
    let mut edge = end - start;
    let length = edge.length();
    if length > EDGE_EPSILON {
        edge /= length;
    }

    let normal = edge.perp();
    let x = to_point.dot(edge);

    if x <= 0.0 {
        EdgeProjection {
            point: start,
            normal,
            edge_distance: 0.0,
            distance: point.distance_squared(start),
        }
    } else if x >= length {
        EdgeProjection {
            point: end,
            normal,
            edge_distance: 1.0,
            distance: point.distance_squared(end),
        }
    } else {
        let distance = to_point.perp_dot(edge);
        EdgeProjection {
            point: start + edge * x,
            normal,
            edge_distance: x / length,
            distance: distance * distance,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SpringSetup {
    Rigid,
    Spring {
        edge_stiffness: f32,
        edge_damping: f32,
        shape_stiffness: f32,
        shape_damping: f32,
    },
}

/// Fluent construction of rigid, spring and pressure bodies.
pub struct BodyBuilder {
    shape: Shape,
    mass: f32,
    position: Vec2,
    angle: f32,
    scale: Vec2,
    damping: f32,
    is_static: bool,
    springs: SpringSetup,
    gas_pressure: Option<f32>,
}

impl BodyBuilder {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            mass: 1.0,
            position: Vec2::ZERO,
            angle: 0.0,
            scale: Vec2::ONE,
            damping: DEFAULT_BODY_DAMPING,
            is_static: false,
            springs: SpringSetup::Rigid,
            gas_pressure: None,
        }
    }

    /// Mass of each point mass.
    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Immovable body: every point mass gets infinite mass.
    pub fn static_body(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Edge springs plus shape-matching springs (disabled when `shape_stiffness <= 0`).
    pub fn springs(mut self, edge_stiffness: f32, edge_damping: f32, shape_stiffness: f32, shape_damping: f32) -> Self {
        self.springs = SpringSetup::Spring {
            edge_stiffness,
            edge_damping,
            shape_stiffness,
            shape_damping,
        };
        self
    }

    pub fn pressure(mut self, gas_pressure: f32) -> Self {
        self.gas_pressure = Some(gas_pressure);
        self
    }

    pub fn build(self) -> Body {
        let mass = if self.is_static { f32::INFINITY } else { self.mass };
        let mut body = Body::new(&self.shape, mass, self.position, self.angle, self.scale);
        body.damping = self.damping;
        body.is_static = self.is_static;

        let springs = match self.springs {
            SpringSetup::Rigid if self.gas_pressure.is_none() => None,
            SpringSetup::Rigid => Some(SpringModel::new(&body.point_masses, 0.0, 0.0, 0.0, 0.0)),
            SpringSetup::Spring {
                edge_stiffness,
                edge_damping,
                shape_stiffness,
                shape_damping,
            } => Some(SpringModel::new(
                &body.point_masses,
                edge_stiffness,
                edge_damping,
                shape_stiffness,
                shape_damping,
            )),
        };

        body.kind = match (springs, self.gas_pressure) {
            (None, _) => BodyKind::Rigid,
            (Some(springs), None) => BodyKind::Spring(springs),
            (Some(springs), Some(gas_pressure)) => BodyKind::Pressure {
                springs,
                pressure: PressureModel::new(body.point_masses.len(), gas_pressure),
            },
        };

        body
    }
}
