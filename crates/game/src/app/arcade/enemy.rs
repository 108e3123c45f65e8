use std::collections::HashSet;

use engine::{EntityId, SceneWorld, Vec2};

const HOMING_FALLBACK: Vec2 = Vec2::new(1.0, 0.0);

/// Velocity of magnitude `speed` from `from` toward `to`. A zero-length
/// offset points along +x so the enemy never stalls.
pub(crate) fn homing_velocity(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    (to - from).normalize_or(HOMING_FALLBACK) * speed
}

/// Re-aims every live enemy at `target` and forgets ids the world no
/// longer knows.
pub(crate) fn steer_enemies(
    enemies: &mut HashSet<EntityId>,
    target: Vec2,
    speed: f32,
    world: &mut SceneWorld,
) {
    enemies.retain(|id| match world.position(*id) {
        Some(position) => {
            world.set_velocity(*id, homing_velocity(position, target, speed));
            true
        }
        None => false,
    });
}
