use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box grown point by point.
///
/// A box with nothing inserted is invalid: it contains no point and overlaps nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
    valid: bool,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
            valid: true,
        }
    }

    pub fn empty() -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::ZERO,
            valid: false,
        }
    }

    pub fn from_points(points: &[Vec2]) -> Self {
        let mut bounds = Self::empty();
        for &p in points {
            bounds.extend(p);
        }
        bounds
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    pub fn extend(&mut self, point: Vec2) {
        if self.valid {
            self.min = self.min.min(point);
            self.max = self.max.max(point);
        } else {
            self.min = point;
            self.max = point;
            self.valid = true;
        }
    }

    /// Grows the box to cover another valid box.
    pub fn merge(&mut self, other: &Aabb) {
        if other.valid {
            self.extend(other.min);
            self.extend(other.max);
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.valid
            && point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        if !self.valid || !other.valid {
            return false;
        }
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.max.y < other.min.y
            || self.min.y > other.max.y)
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        if self.valid {
            self.max - self.min
        } else {
            Vec2::ZERO
        }
    }
}
