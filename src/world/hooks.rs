use std::fmt;

use parking_lot::Mutex;

use crate::{collision::contact::CollisionInfo, utils::allocator::BodyId};

type AabbHook = Box<dyn FnMut(BodyId, BodyId) + Send>;
type CollisionHook = Box<dyn FnMut(BodyId, BodyId, &CollisionInfo) + Send>;
type PenetrationHook = Box<dyn FnMut(f32, BodyId, BodyId) + Send>;

/// Optional observers notified while a tick runs.
///
/// Hooks only receive ids and copies of collision data; they cannot reach
/// back into the world while it is stepping.
#[derive(Default)]
pub struct EventHooks {
    on_aabb_collision: Option<Mutex<AabbHook>>,
    on_collision: Option<Mutex<CollisionHook>>,
    on_penetration: Option<Mutex<PenetrationHook>>,
}

impl fmt::Debug for EventHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHooks")
            .field("on_aabb_collision", &self.on_aabb_collision.is_some())
            .field("on_collision", &self.on_collision.is_some())
            .field("on_penetration", &self.on_penetration.is_some())
            .finish()
    }
}

impl EventHooks {
    pub fn set_on_aabb_collision<F>(&mut self, hook: F)
    where
        F: FnMut(BodyId, BodyId) + Send + 'static,
    {
        self.on_aabb_collision = Some(Mutex::new(Box::new(hook)));
    }

    pub fn set_on_collision<F>(&mut self, hook: F)
    where
        F: FnMut(BodyId, BodyId, &CollisionInfo) + Send + 'static,
    {
        self.on_collision = Some(Mutex::new(Box::new(hook)));
    }

    pub fn set_on_penetration<F>(&mut self, hook: F)
    where
        F: FnMut(f32, BodyId, BodyId) + Send + 'static,
    {
        self.on_penetration = Some(Mutex::new(Box::new(hook)));
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn aabb_collision(&self, a: BodyId, b: BodyId) {
        if let Some(hook) = &self.on_aabb_collision {
            let mut hook = hook.lock();
            (*hook)(a, b);
        }
    }

    pub(crate) fn collision(&self, info: &CollisionInfo) {
        if let Some(hook) = &self.on_collision {
            let mut hook = hook.lock();
            (*hook)(info.body_a, info.body_b, info);
        }
    }

    pub(crate) fn penetration(&self, info: &CollisionInfo) {
        if let Some(hook) = &self.on_penetration {
            let mut hook = hook.lock();
            (*hook)(info.penetration, info.body_a, info.body_b);
        }
    }
}
