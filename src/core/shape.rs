use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::math::transform_point;

/// Misuse of the two-phase shape construction protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("begin() called while a shape is already being built; call end() first")]
    AlreadyBegun,
    #[error("begin() must be called before adding points or calling end()")]
    NotBegun,
    #[error("a closed polygon needs at least 3 points, got {0}")]
    TooFewPoints(usize),
}

#[derive(Debug, Default)]
struct PendingPoints {
    points: Vec<Vec2>,
    center: bool,
}

/// Ordered, closed polygon: `points[i]` connects to `points[(i + 1) % count]`.
///
/// The simulation expects clockwise winding in a y-up frame, so that the
/// perpendicular `(-y, x)` of every edge points outward.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Shape {
    points: Vec<Vec2>,
    #[serde(skip)]
    pending: Option<PendingPoints>,
}

impl Clone for Shape {
    /// Copies the finalized points only; an open builder is not carried over.
    fn clone(&self) -> Self {
        Self {
            points: self.points.clone(),
            pending: None,
        }
    }
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a finalized shape in one go.
    pub fn from_points<I>(points: I, center: bool) -> Result<Self, ShapeError>
    where
        I: IntoIterator<Item = Vec2>,
    {
        let mut shape = Self::new();
        shape.begin(center)?;
        for point in points {
            shape.add(point)?;
        }
        shape.end()?;
        Ok(shape)
    }

    /// Axis-aligned rectangle centered on the origin.
    pub fn rectangle(width: f32, height: f32) -> Self {
        let hw = width * 0.5;
        let hh = height * 0.5;
        Self {
            points: vec![
                Vec2::new(-hw, hh),
                Vec2::new(hw, hh),
                Vec2::new(hw, -hh),
                Vec2::new(-hw, -hh),
            ],
            pending: None,
        }
    }

    /// Regular polygon inscribed in a circle of `radius`, wound clockwise.
    pub fn regular_polygon(sides: usize, radius: f32) -> Result<Self, ShapeError> {
        let points = (0..sides).map(|i| {
            let angle = -TAU * i as f32 / sides as f32;
            Vec2::new(angle.cos(), angle.sin()) * radius
        });
        Self::from_points(points, true)
    }

    /// Opens the point buffer. Fails if a previous `begin` was never closed.
    pub fn begin(&mut self, center: bool) -> Result<(), ShapeError> {
        if self.pending.is_some() {
            return Err(ShapeError::AlreadyBegun);
        }
        self.pending = Some(PendingPoints {
            points: Vec::new(),
            center,
        });
        Ok(())
    }

    pub fn add(&mut self, point: Vec2) -> Result<(), ShapeError> {
        let pending = self.pending.as_mut().ok_or(ShapeError::NotBegun)?;
        pending.points.push(point);
        Ok(())
    }

    /// Freezes the buffer into the shape's points, recentering if requested.
    ///
    /// The buffer is closed even on error, leaving the previous points untouched.
    pub fn end(&mut self) -> Result<(), ShapeError> {
        let pending = self.pending.take().ok_or(ShapeError::NotBegun)?;
        if pending.points.len() < 3 {
            return Err(ShapeError::TooFewPoints(pending.points.len()));
        }

        self.points = pending.points;
        if pending.center {
            self.center_at_zero();
        }
        Ok(())
    }

    pub fn is_building(&self) -> bool {
        self.pending.is_some()
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut [Vec2] {
        &mut self.points
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }

    pub fn center(&self) -> Vec2 {
        if self.points.is_empty() {
            return Vec2::ZERO;
        }
        self.points.iter().copied().sum::<Vec2>() / self.points.len() as f32
    }

    /// Translates the points so that their centroid is the origin.
    pub fn center_at_zero(&mut self) {
        let centroid = self.center();
        for point in &mut self.points {
            *point -= centroid;
        }
    }

    /// Shoelace area; negative for clockwise winding.
    pub fn signed_area(&self) -> f32 {
        let count = self.points.len();
        let mut area = 0.0;
        for i in 0..count {
            let a = self.points[i];
            let b = self.points[(i + 1) % count];
            area += a.perp_dot(b);
        }
        area * 0.5
    }

    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.0
    }

    /// Scales, rotates by `angle` and translates every point into a new array.
    pub fn transform(points: &[Vec2], position: Vec2, angle: f32, scale: Vec2) -> Vec<Vec2> {
        points
            .iter()
            .map(|&p| transform_point(p, position, angle, scale))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn builder_rejects_misuse() {
        let mut shape = Shape::new();
        assert_eq!(shape.add(Vec2::ZERO), Err(ShapeError::NotBegun));
        assert_eq!(shape.end(), Err(ShapeError::NotBegun));

        shape.begin(false).unwrap();
        assert_eq!(shape.begin(false), Err(ShapeError::AlreadyBegun));
        shape.add(Vec2::ZERO).unwrap();
        shape.add(Vec2::X).unwrap();
        assert_eq!(shape.end(), Err(ShapeError::TooFewPoints(2)));
        assert!(!shape.is_building());
    }

    #[test]
    fn end_recenters_on_request() {
        let points = [Vec2::new(0.0, 2.0), Vec2::new(2.0, 2.0), Vec2::new(2.0, 0.0), Vec2::ZERO];
        let shape = Shape::from_points(points, true).unwrap();
        assert_abs_diff_eq!(shape.center().length(), 0.0, epsilon = 1e-6);
        assert_eq!(shape.points()[0], Vec2::new(-1.0, 1.0));

        let raw = Shape::from_points(points, false).unwrap();
        assert_eq!(raw.points()[0], Vec2::new(0.0, 2.0));
    }

    #[test]
    fn clone_does_not_alias_points() {
        let original = Shape::rectangle(2.0, 2.0);
        let mut copy = original.clone();
        copy.points_mut()[0] = Vec2::new(50.0, 50.0);

        assert_eq!(original.points()[0], Vec2::new(-1.0, 1.0));
        assert_eq!(copy.points()[0], Vec2::new(50.0, 50.0));
    }

    #[test]
    fn generated_shapes_are_clockwise() {
        assert!(Shape::rectangle(3.0, 1.0).is_clockwise());
        assert!(Shape::regular_polygon(7, 2.0).unwrap().is_clockwise());
        assert_abs_diff_eq!(Shape::rectangle(3.0, 1.0).signed_area(), -3.0, epsilon = 1e-5);
    }

    #[test]
    fn transform_is_pure() {
        let shape = Shape::rectangle(2.0, 2.0);
        let moved = Shape::transform(shape.points(), Vec2::new(10.0, 0.0), FRAC_PI_2, Vec2::ONE);

        assert_eq!(shape.points()[1], Vec2::new(1.0, 1.0));
        assert_abs_diff_eq!(moved[1].x, 9.0, epsilon = 1e-5);
        assert_abs_diff_eq!(moved[1].y, 1.0, epsilon = 1e-5);
    }
}
