//! Additional 2D math helpers layered on top of `glam`.

use std::f32::consts::PI;

use glam::Vec2;

/// Returns true when rotating from `a` to `b` is counter-clockwise (or exactly opposite).
pub fn is_ccw(a: Vec2, b: Vec2) -> bool {
    b.dot(a.perp()) >= 0.0
}

/// Rotates and scales `point`, then translates it by `position`.
pub fn transform_point(point: Vec2, position: Vec2, angle: f32, scale: Vec2) -> Vec2 {
    let x = point.x * scale.x;
    let y = point.y * scale.y;
    let (s, c) = angle.sin_cos();
    Vec2::new(c * x - s * y + position.x, c * y + s * x + position.y)
}

/// Signed angle from `from` to `to`, both assumed normalized.
pub fn signed_angle(from: Vec2, to: Vec2) -> f32 {
    let dot = from.dot(to).clamp(-1.0, 1.0);
    let angle = dot.acos();
    if is_ccw(from, to) {
        angle
    } else {
        -angle
    }
}

/// Folds an angle delta by one full turn once its magnitude reaches π.
///
/// Exactly ±π flips to ∓π, so the half turn itself has no preferred sign.
pub fn wrap_angle_delta(delta: f32) -> f32 {
    if delta.abs() >= PI {
        if delta < 0.0 {
            delta + 2.0 * PI
        } else {
            delta - 2.0 * PI
        }
    } else {
        delta
    }
}

/// Inverse of a point mass' mass; infinite masses are immovable.
pub fn inverse_mass(mass: f32) -> f32 {
    if mass.is_infinite() {
        0.0
    } else {
        1.0 / mass
    }
}
