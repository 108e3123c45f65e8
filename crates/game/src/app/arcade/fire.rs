use std::collections::HashSet;

use engine::{Body, EntityId, RenderableDesc, RenderableKind, SceneWorld, Transform, Vec2};
use tracing::debug;

use super::session::ArcadeSession;
use super::types::{Direction, PROJECTILES, PROJECTILE_SCALE, PROJECTILE_SPRITE, PROJECTILE_TINT};

/// Velocity for a projectile fired with `facing`; no facing leaves it
/// stationary.
pub(crate) fn projectile_velocity(facing: Option<Direction>, speed: f32) -> Vec2 {
    facing.map_or(Vec2::ZERO, |direction| direction.unit() * speed)
}

/// Fixed number of projectile slots. A slot is held from spawn until the
/// projectile is destroyed or leaves the field.
#[derive(Debug, Clone)]
pub(crate) struct ProjectilePool {
    capacity: usize,
    half_size: f32,
    active: HashSet<EntityId>,
}

impl ProjectilePool {
    pub(crate) fn new(capacity: usize, half_size: f32) -> Self {
        Self {
            capacity,
            half_size,
            active: HashSet::with_capacity(capacity),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn active_count(&self) -> usize {
        self.active.len()
    }

    pub(crate) fn contains(&self, id: EntityId) -> bool {
        self.active.contains(&id)
    }

    /// Spawns a projectile when a slot is free; `None` means the pool is
    /// exhausted and nothing was created.
    pub(crate) fn spawn(
        &mut self,
        world: &mut SceneWorld,
        position: Vec2,
        velocity: Vec2,
    ) -> Option<EntityId> {
        if self.active.len() >= self.capacity {
            return None;
        }
        let id = world.spawn_body(
            Transform::at(position),
            RenderableDesc {
                kind: RenderableKind::Sprite(PROJECTILE_SPRITE.to_string()),
                debug_name: "projectile",
                scale: PROJECTILE_SCALE,
                tint: PROJECTILE_TINT,
            },
            Body {
                half_extents: Vec2::new(self.half_size, self.half_size),
                group: Some(PROJECTILES),
                collide_world_bounds: false,
                cull_outside_field: true,
            },
        );
        world.set_velocity(id, velocity);
        self.active.insert(id);
        Some(id)
    }

    pub(crate) fn release(&mut self, id: EntityId) -> bool {
        self.active.remove(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.active.clear();
    }
}

impl ArcadeSession {
    /// Fires one projectile from the player's position along its facing.
    /// An exhausted pool is a silent no-op apart from the drop counter.
    pub(crate) fn fire(&mut self, world: &mut SceneWorld) -> Option<EntityId> {
        let origin = self.player_position(world);
        let velocity = projectile_velocity(self.player.facing, self.tuning.projectile_speed);
        match self.projectiles.spawn(world, origin, velocity) {
            Some(id) => {
                self.stats.record_fired();
                debug!(
                    x = origin.x,
                    y = origin.y,
                    vx = velocity.x,
                    vy = velocity.y,
                    "projectile_fired"
                );
                Some(id)
            }
            None => {
                self.stats.record_dropped();
                debug!(
                    capacity = self.projectiles.capacity(),
                    "projectile_pool_exhausted"
                );
                None
            }
        }
    }
}
