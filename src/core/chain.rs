use glam::Vec2;

use crate::{
    config::DEFAULT_CHAIN_DAMPING,
    dynamics::integrator::Integrator,
    utils::allocator::{ChainId, PointMassId},
};

use super::{spring::Spring, types::PointMass};

/// Where a chain end is held.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChainAnchor {
    /// Follows a point mass owned by a body; the chain pulls on it in return.
    Body(PointMassId),
    /// A free point mass owned by the chain, typically an infinite-mass anchor.
    Point(PointMass),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainEnd {
    Start,
    End,
}

/// Open string of point masses joined by springs, held at both ends.
#[derive(Debug, Clone)]
pub struct Chain {
    pub id: ChainId,
    pub damping: f32,
    point_masses: Vec<PointMass>,
    springs: Vec<Spring>,
    attachments: [Option<PointMassId>; 2],
}

impl Chain {
    /// Lays `links` springs between `start` and `end`, with `links - 1`
    /// interior point masses of `mass` evenly spaced along the segment.
    pub fn new(start: PointMass, end: PointMass, links: usize, stiffness: f32, damping: f32, mass: f32) -> Self {
        let links = links.max(1);
        let mut point_masses = Vec::with_capacity(links + 1);
        point_masses.push(start);
        for i in 1..links {
            let t = i as f32 / links as f32;
            point_masses.push(PointMass::new(start.position.lerp(end.position, t), mass));
        }
        point_masses.push(end);

        let springs = (0..links)
            .map(|i| Spring::new(&point_masses, i, i + 1, stiffness, damping))
            .collect();

        Self {
            id: ChainId::default(),
            damping: DEFAULT_CHAIN_DAMPING,
            point_masses,
            springs,
            attachments: [None, None],
        }
    }

    pub fn point_masses(&self) -> &[PointMass] {
        &self.point_masses
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    fn slot(&self, end: ChainEnd) -> usize {
        match end {
            ChainEnd::Start => 0,
            ChainEnd::End => self.point_masses.len() - 1,
        }
    }

    pub fn anchor(&self, end: ChainEnd) -> &PointMass {
        &self.point_masses[self.slot(end)]
    }

    pub fn attachment(&self, end: ChainEnd) -> Option<PointMassId> {
        self.attachments[end as usize]
    }

    pub fn set_attachment(&mut self, end: ChainEnd, point_mass: Option<PointMassId>) {
        self.attachments[end as usize] = point_mass;
    }

    /// Moves an anchor; used to follow the body point mass it is attached to.
    pub fn set_anchor(&mut self, end: ChainEnd, position: Vec2, velocity: Vec2) {
        let slot = self.slot(end);
        let anchor = &mut self.point_masses[slot];
        anchor.position = position;
        anchor.velocity = velocity;
    }

    /// Returns and clears the spring force accumulated on an anchor.
    pub fn take_anchor_force(&mut self, end: ChainEnd) -> Vec2 {
        let slot = self.slot(end);
        std::mem::take(&mut self.point_masses[slot].force)
    }

    /// Applies every spring, then integrates the interior point masses only.
    pub fn update(&mut self, dt: f32) {
        for spring in &self.springs {
            spring.apply(&mut self.point_masses);
        }

        let last = self.point_masses.len() - 1;
        Integrator::new(self.damping).step_all(&mut self.point_masses[1..last], dt);

        for end in [ChainEnd::Start, ChainEnd::End] {
            if self.attachment(end).is_none() {
                self.take_anchor_force(end);
            }
        }
    }

    /// Total length of the springs at rest.
    pub fn rest_length(&self) -> f32 {
        self.springs.iter().map(|s| s.rest_length).sum()
    }
}
