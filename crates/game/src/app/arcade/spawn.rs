use engine::{Body, EntityId, RenderableDesc, RenderableKind, SceneWorld, Transform, Vec2};
use tracing::{debug, warn};

use super::enemy::homing_velocity;
use super::session::ArcadeSession;
use super::types::{ACTOR_SCALE, ENEMIES, ENEMY_SPRITE, ENEMY_TINT};

impl ArcadeSession {
    /// Creates one enemy at the point of `rule_index`, already aimed at the
    /// player. Unknown indices spawn nothing.
    pub(crate) fn spawn_enemy(&mut self, rule_index: usize, world: &mut SceneWorld) -> Option<EntityId> {
        let Some(rule) = self.rules.get(rule_index).copied() else {
            warn!(rule_index, "spawn_rule_unknown");
            return None;
        };
        let half = self.tuning.enemy_half_size;
        let id = world.spawn_body(
            Transform::at(rule.point),
            RenderableDesc {
                kind: RenderableKind::Sprite(ENEMY_SPRITE.to_string()),
                debug_name: "enemy",
                scale: ACTOR_SCALE,
                tint: ENEMY_TINT,
            },
            Body {
                half_extents: Vec2::new(half, half),
                group: Some(ENEMIES),
                collide_world_bounds: false,
                cull_outside_field: false,
            },
        );
        let target = self.player_position(world);
        world.set_velocity(id, homing_velocity(rule.point, target, self.tuning.enemy_speed));
        self.enemies.insert(id);

        let live_enemies = self.enemies.len();
        let step = self.tuning.enemy_growth_warn_step;
        if self.stats.record_spawn(rule_index, live_enemies, step) {
            warn!(
                live_enemies,
                enemies_spawned = self.stats.enemies_spawned,
                "enemy_population_growing"
            );
        }
        debug!(
            rule_index,
            x = rule.point.x,
            y = rule.point.y,
            live_enemies,
            "enemy_spawned"
        );
        Some(id)
    }
}
