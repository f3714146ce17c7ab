use glam::Vec2;

/// Tangential impulse opposing sliding along the contact surface.
///
/// `inverse_mass_sum` is the effective inverse mass of the contact; the
/// impulse is applied positively to the penetrating point and negatively to
/// the edge it collides with.
pub fn tangential_impulse(relative_velocity: Vec2, normal: Vec2, friction: f32, inverse_mass_sum: f32) -> Vec2 {
    if inverse_mass_sum <= f32::EPSILON {
        return Vec2::ZERO;
    }

    let tangent = normal.perp();
    let sliding = relative_velocity.dot(tangent);
    -tangent * (sliding * friction / inverse_mass_sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn friction_opposes_sliding() {
        let impulse = tangential_impulse(Vec2::new(0.0, 2.0), Vec2::X, 0.5, 1.0);
        assert_abs_diff_eq!(impulse.y, -1.0);
        assert_abs_diff_eq!(impulse.x, 0.0);
    }

    #[test]
    fn immovable_contact_gets_no_friction() {
        assert_eq!(tangential_impulse(Vec2::ONE, Vec2::X, 1.0, 0.0), Vec2::ZERO);
    }
}
