use kinematics2d::{Body, PhysicsEngine, PhysicsWorld, Shape, Vec2, WorldSettings};
use std::sync::{Arc, Mutex};
use std::thread;

#[test]
fn test_physics_world_is_sync_and_send() {
    fn assert_sync_send<T: Sync + Send>() {}
    assert_sync_send::<PhysicsWorld>();
    assert_sync_send::<PhysicsEngine>();
    assert_sync_send::<Body>();
}

#[test]
fn test_shared_physics_world_across_threads() {
    let settings = WorldSettings::default().with_gravity(Vec2::new(0.0, -9.81));
    let mut world = PhysicsWorld::with_settings(settings);
    let id = world.add_body(
        Body::builder(Shape::rectangle(1.0, 1.0))
            .position(Vec2::new(0.0, 10.0))
            .springs(100.0, 2.0, 50.0, 1.0)
            .build(),
    );
    let world = Arc::new(Mutex::new(world));

    let mut handles = vec![];
    for _ in 0..4 {
        let world_clone = Arc::clone(&world);
        let handle = thread::spawn(move || {
            let mut world = world_clone.lock().unwrap();
            world.update(1.0 / 60.0);
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let world = world.lock().unwrap();
    assert!(world.body(id).unwrap().position.y < 10.0);
}

#[test]
fn test_hooks_can_report_to_other_threads() {
    let (sender, receiver) = std::sync::mpsc::channel();
    let mut world = PhysicsWorld::new();
    world.add_body(Body::builder(Shape::rectangle(10.0, 10.0)).static_body().build());
    world.add_body(
        Body::builder(Shape::rectangle(0.5, 0.5))
            .position(Vec2::new(5.1, 0.0))
            .build(),
    );
    world.hooks_mut().set_on_penetration(move |depth, _, _| {
        let _ = sender.send(depth);
    });

    let handle = thread::spawn(move || {
        world.update(0.0);
        world
    });
    let world = handle.join().unwrap();

    let depths: Vec<f32> = receiver.try_iter().collect();
    assert_eq!(depths.len(), world.collisions().len());
    assert!(depths.iter().all(|d| (d - 0.15).abs() < 1e-4));
}
