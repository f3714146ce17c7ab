use approx::assert_abs_diff_eq;
use kinematics2d::*;

struct Scene {
    bodies: Arena<Body>,
    info: CollisionInfo,
}

fn scene(point_mass: f32, edge_mass: f32) -> Scene {
    let mut bodies = Arena::new();
    let a = bodies.insert(
        Body::builder(Shape::rectangle(1.0, 1.0))
            .mass(point_mass)
            .build(),
    );
    let b = bodies.insert(
        Body::builder(Shape::rectangle(1.0, 1.0))
            .mass(edge_mass)
            .position(Vec2::new(5.0, 0.0))
            .build(),
    );

    bodies.get_mut(a).unwrap().point_masses_mut()[0].velocity = Vec2::new(-1.0, 0.5);
    {
        let edge = bodies.get_mut(b).unwrap().point_masses_mut();
        edge[1].velocity = Vec2::new(1.0, 0.0);
        edge[2].velocity = Vec2::new(1.0, 0.0);
    }

    let info = CollisionInfo {
        body_a: a,
        body_b: b,
        point_mass_a: 0,
        point_mass_b: 1,
        point_mass_c: 2,
        edge_distance: 0.3,
        normal: Vec2::X,
        point: Vec2::new(5.5, 0.2),
        penetration: 0.1,
    };
    Scene { bodies, info }
}

fn total_momentum(bodies: &Arena<Body>) -> Vec2 {
    bodies.values().map(Body::total_momentum).sum()
}

fn relative_normal_velocity(bodies: &Arena<Body>, info: &CollisionInfo) -> f32 {
    let a = bodies.get(info.body_a).unwrap().point_masses()[info.point_mass_a];
    let b = bodies.get(info.body_b).unwrap();
    let (w1, w2) = info.edge_weights();
    let edge = b.point_masses()[info.point_mass_b].velocity * w1 + b.point_masses()[info.point_mass_c].velocity * w2;
    (a.velocity - edge).dot(info.normal)
}

#[test]
fn impulse_conserves_momentum_without_friction() {
    let Scene { mut bodies, info } = scene(1.0, 1.0);
    let before = total_momentum(&bodies);

    let solver = CollisionSolver {
        friction: 0.0,
        elasticity: 1.0,
        ..CollisionSolver::default()
    };
    let metrics = solver.resolve(&mut bodies, &[info]);

    assert_eq!(metrics.contacts_solved, 1);
    assert!(metrics.normal_impulse_sum > 0.0);
    assert_eq!(metrics.tangent_impulse_sum, 0.0);

    let after = total_momentum(&bodies);
    assert_abs_diff_eq!(before.x, after.x, epsilon = 1e-5);
    assert_abs_diff_eq!(before.y, after.y, epsilon = 1e-5);
}

#[test]
fn impulse_conserves_momentum_with_friction() {
    let Scene { mut bodies, info } = scene(1.0, 1.0);
    let before = total_momentum(&bodies);

    let solver = CollisionSolver {
        friction: 1.9,
        elasticity: 1.0,
        ..CollisionSolver::default()
    };
    let metrics = solver.resolve(&mut bodies, &[info]);

    assert!(metrics.tangent_impulse_sum > 0.0);
    let after = total_momentum(&bodies);
    assert_abs_diff_eq!(before.x, after.x, epsilon = 1e-5);
    assert_abs_diff_eq!(before.y, after.y, epsilon = 1e-5);
}

#[test]
fn full_elasticity_cancels_approach_velocity() {
    let Scene { mut bodies, info } = scene(1.0, 1.0);
    assert!(relative_normal_velocity(&bodies, &info) < 0.0);

    let solver = CollisionSolver {
        friction: 0.0,
        elasticity: 1.0,
        ..CollisionSolver::default()
    };
    solver.resolve(&mut bodies, &[info]);

    assert_abs_diff_eq!(relative_normal_velocity(&bodies, &info), 0.0, epsilon = 1e-5);
}

#[test]
fn heavier_side_moves_less() {
    let Scene { mut bodies, info } = scene(1.0, 4.0);
    let a_before = bodies.get(info.body_a).unwrap().point_masses()[0].position;
    let b_before = bodies.get(info.body_b).unwrap().point_masses()[1].position;

    CollisionSolver::default().resolve(&mut bodies, &[info]);

    let a_after = bodies.get(info.body_a).unwrap().point_masses()[0].position;
    let b_after = bodies.get(info.body_b).unwrap().point_masses()[1].position;

    let a_moved = (a_after - a_before).length();
    let b_moved = (b_after - b_before).length();
    assert!(a_moved > 0.0 && b_moved > 0.0);
    assert!(a_moved > b_moved * 4.0, "point moved {a_moved}, edge moved {b_moved}");

    // The point is pushed along the normal and the edge away from it.
    assert!(a_after.x > a_before.x);
    assert!(b_after.x < b_before.x);
}

#[test]
fn contacts_with_missing_bodies_are_ignored() {
    let Scene { mut bodies, info } = scene(1.0, 1.0);
    bodies.remove(info.body_b);

    let metrics = CollisionSolver::default().resolve(&mut bodies, &[info]);
    assert_eq!(metrics, SolverStepMetrics::default());
}
