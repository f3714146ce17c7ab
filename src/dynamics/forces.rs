use glam::Vec2;

use crate::{
    config::NORMAL_EPSILON,
    core::{
        spring::{spring_force, Spring},
        types::PointMass,
    },
};

/// Edge springs around the polygon plus optional shape-matching springs.
#[derive(Debug, Clone)]
pub struct SpringModel {
    pub springs: Vec<Spring>,
    pub edge_stiffness: f32,
    pub edge_damping: f32,
    /// Shape matching is disabled when this is not positive.
    pub shape_stiffness: f32,
    pub shape_damping: f32,
    pub is_constrained: bool,
}

impl SpringModel {
    /// Wires one spring per adjacent pair, closing the loop last-to-first.
    pub fn new(
        point_masses: &[PointMass],
        edge_stiffness: f32,
        edge_damping: f32,
        shape_stiffness: f32,
        shape_damping: f32,
    ) -> Self {
        let count = point_masses.len();
        let springs = (0..count)
            .map(|i| Spring::new(point_masses, i, (i + 1) % count, edge_stiffness, edge_damping))
            .collect();

        Self {
            springs,
            edge_stiffness,
            edge_damping,
            shape_stiffness,
            shape_damping,
            is_constrained: true,
        }
    }

    pub fn add_spring(&mut self, spring: Spring) {
        self.springs.push(spring);
    }

    pub fn apply(&self, point_masses: &mut [PointMass], current_shape: &[Vec2]) {
        for spring in &self.springs {
            spring.apply(point_masses);
        }

        if !self.is_constrained || self.shape_stiffness <= 0.0 {
            return;
        }

        // Zero-length springs towards the matched rest pose. The target moves
        // with the point, so only stiffness contributes, not damping.
        for (point_mass, &target) in point_masses.iter_mut().zip(current_shape) {
            point_mass.force += spring_force(
                point_mass.position,
                point_mass.velocity,
                target,
                point_mass.velocity,
                0.0,
                self.shape_stiffness,
                self.shape_damping,
            );
        }
    }
}

/// Internal gas pressure pushing every edge outward.
#[derive(Debug, Clone)]
pub struct PressureModel {
    pub gas_pressure: f32,
    normals: Vec<Vec2>,
    edge_lengths: Vec<f32>,
    volume: f32,
}

impl PressureModel {
    pub fn new(count: usize, gas_pressure: f32) -> Self {
        Self {
            gas_pressure,
            normals: vec![Vec2::ZERO; count],
            edge_lengths: vec![0.0; count],
            volume: 0.0,
        }
    }

    /// Approximate enclosed volume computed by the last [`PressureModel::apply`].
    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    pub fn apply(&mut self, point_masses: &mut [PointMass]) {
        let count = point_masses.len();
        self.normals.resize(count, Vec2::ZERO);
        self.edge_lengths.resize(count, 0.0);
        self.volume = 0.0;

        for i in 0..count {
            let prev = if i > 0 { i - 1 } else { count - 1 };
            let next = if i + 1 < count { i + 1 } else { 0 };

            let position = point_masses[i].position;
            let next_position = point_masses[next].position;

            let edge_in = (position - point_masses[prev].position).perp();
            let edge_out = (next_position - position).perp();

            let sum = edge_in + edge_out;
            let length = sum.length();
            let normal = if length > NORMAL_EPSILON {
                sum / length
            } else {
                Vec2::ZERO
            };

            let edge_length = edge_out.length();
            self.normals[i] = normal;
            self.edge_lengths[i] = edge_length;

            let x_distance = (position.x - next_position.x).abs();
            self.volume += 0.5 * x_distance * normal.x.abs() * edge_length;
        }

        if self.volume <= f32::EPSILON {
            return;
        }

        let inverse_volume = 1.0 / self.volume;
        for i in 0..count {
            let j = if i + 1 < count { i + 1 } else { 0 };
            let pressure = inverse_volume * self.edge_lengths[i] * self.gas_pressure;

            point_masses[i].force += self.normals[i] * pressure;
            point_masses[j].force += self.normals[j] * pressure;
        }
    }
}

/// Closed set of internal force generators a body can carry.
#[derive(Debug, Clone, Default)]
pub enum BodyKind {
    /// No internal forces; the polygon is held together by collisions only.
    #[default]
    Rigid,
    Spring(SpringModel),
    Pressure {
        springs: SpringModel,
        pressure: PressureModel,
    },
}

impl BodyKind {
    pub fn apply(&mut self, point_masses: &mut [PointMass], current_shape: &[Vec2]) {
        match self {
            BodyKind::Rigid => {}
            BodyKind::Spring(springs) => springs.apply(point_masses, current_shape),
            BodyKind::Pressure { springs, pressure } => {
                springs.apply(point_masses, current_shape);
                pressure.apply(point_masses);
            }
        }
    }

    pub fn springs(&self) -> Option<&SpringModel> {
        match self {
            BodyKind::Rigid => None,
            BodyKind::Spring(springs) | BodyKind::Pressure { springs, .. } => Some(springs),
        }
    }

    pub fn springs_mut(&mut self) -> Option<&mut SpringModel> {
        match self {
            BodyKind::Rigid => None,
            BodyKind::Spring(springs) | BodyKind::Pressure { springs, .. } => Some(springs),
        }
    }

    pub fn pressure(&self) -> Option<&PressureModel> {
        match self {
            BodyKind::Pressure { pressure, .. } => Some(pressure),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square_masses() -> Vec<PointMass> {
        [
            Vec2::new(-1.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(-1.0, -1.0),
        ]
        .into_iter()
        .map(|p| PointMass::new(p, 1.0))
        .collect()
    }

    #[test]
    fn edge_springs_close_the_loop() {
        let masses = square_masses();
        let model = SpringModel::new(&masses, 10.0, 1.0, 0.0, 0.0);

        assert_eq!(model.springs.len(), 4);
        assert_eq!(model.springs[3].point_mass_a, 3);
        assert_eq!(model.springs[3].point_mass_b, 0);
        assert_abs_diff_eq!(model.springs[3].rest_length, 2.0);
    }

    #[test]
    fn pressure_pushes_vertices_outward() {
        let mut masses = square_masses();
        let mut pressure = PressureModel::new(masses.len(), 10.0);
        pressure.apply(&mut masses);

        assert!(pressure.volume() > 0.0);
        for mass in &masses {
            assert!(mass.force.dot(mass.position) > 0.0, "force {:?}", mass.force);
        }
    }

    #[test]
    fn collapsed_polygon_produces_no_pressure() {
        let mut masses = vec![PointMass::new(Vec2::ZERO, 1.0); 3];
        let mut pressure = PressureModel::new(3, 10.0);
        pressure.apply(&mut masses);

        assert_eq!(pressure.volume(), 0.0);
        assert!(masses.iter().all(|m| m.force == Vec2::ZERO));
    }

    #[test]
    fn shape_matching_pulls_towards_target() {
        let mut masses = square_masses();
        let model = SpringModel::new(&masses, 0.0, 0.0, 5.0, 0.0);
        let mut targets: Vec<Vec2> = masses.iter().map(|m| m.position).collect();
        targets[0] += Vec2::new(1.0, 0.0);

        model.apply(&mut masses, &targets);
        assert_abs_diff_eq!(masses[0].force.x, 5.0);
        assert_abs_diff_eq!(masses[1].force.length(), 0.0);
    }
}
