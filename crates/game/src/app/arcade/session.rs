use std::collections::HashSet;

use engine::{Backdrop, EntityId, InputAction, InputSnapshot, SceneWorld, TimerTag, Vec2};
use tracing::debug;

use super::config::ArcadeConfig;
use super::enemy::steer_enemies;
use super::fire::ProjectilePool;
use super::player::{update_player, PlayerState};
use super::stats::SessionStats;
use super::types::{SpawnRule, BACKDROP_SCALE, BACKDROP_SPRITE, ENEMIES, PROJECTILES};

/// Speeds and sizes the policies read every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Tuning {
    pub(crate) enemy_speed: f32,
    pub(crate) enemy_half_size: f32,
    pub(crate) projectile_speed: f32,
    pub(crate) enemy_growth_warn_step: usize,
}

/// All mutable state of one running arcade session.
#[derive(Debug)]
pub(crate) struct ArcadeSession {
    pub(crate) player: PlayerState,
    pub(crate) enemies: HashSet<EntityId>,
    pub(crate) projectiles: ProjectilePool,
    pub(crate) rules: Vec<SpawnRule>,
    pub(crate) tuning: Tuning,
    pub(crate) stats: SessionStats,
}

impl ArcadeSession {
    /// Configures the world, spawns the player and registers one
    /// repeating timer per spawn rule, tagged with the rule index.
    pub(crate) fn start(config: &ArcadeConfig, world: &mut SceneWorld) -> Self {
        world.set_field(config.field_rect());
        world.set_world_bounds(config.world_bounds.to_rect());
        world.set_backdrop(Some(Backdrop {
            sprite_key: BACKDROP_SPRITE.to_string(),
            scale: BACKDROP_SCALE,
        }));
        world.watch_overlap(ENEMIES, PROJECTILES);

        let rules = config.spawn_rules();
        for (index, rule) in rules.iter().enumerate() {
            world.add_repeating_timer(rule.interval, TimerTag(index as u32));
        }

        let player = PlayerState::spawn(config, world);
        Self {
            player,
            enemies: HashSet::new(),
            projectiles: ProjectilePool::new(
                config.projectile_pool_capacity,
                config.projectile_half_size,
            ),
            stats: SessionStats::with_rule_count(rules.len()),
            rules,
            tuning: Tuning {
                enemy_speed: config.enemy_speed,
                enemy_half_size: config.enemy_half_size,
                projectile_speed: config.projectile_speed,
                enemy_growth_warn_step: config.enemy_growth_warn_step,
            },
        }
    }

    pub(crate) fn player_position(&self, world: &SceneWorld) -> Vec2 {
        world.position(self.player.id).unwrap_or(Vec2::ZERO)
    }

    /// Per-tick policy: player movement, enemy homing, then the fire
    /// trigger on its rising edge.
    pub(crate) fn update(&mut self, input: &InputSnapshot, world: &mut SceneWorld) {
        update_player(&mut self.player, input, world);

        let target = self.player_position(world);
        steer_enemies(&mut self.enemies, target, self.tuning.enemy_speed, world);

        if input.just_pressed(InputAction::Fire) {
            self.fire(world);
        }
    }

    pub(crate) fn end(&mut self, world: &mut SceneWorld) {
        for id in self.enemies.drain() {
            world.despawn(id);
        }
        self.projectiles.clear();
        debug!(stats = ?self.stats, "arcade_session_ended");
    }
}
