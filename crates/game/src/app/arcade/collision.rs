use engine::{EntityId, OverlapEvent, SceneWorld};
use tracing::debug;

use super::session::ArcadeSession;
use super::types::{ENEMIES, PROJECTILES};

impl ArcadeSession {
    /// Destroys both sides of an enemy/projectile overlap. Other group
    /// pairs are ignored.
    pub(crate) fn resolve_collision(&mut self, event: OverlapEvent, world: &mut SceneWorld) {
        let (enemy, projectile) = match (event.group_a, event.group_b) {
            (ENEMIES, PROJECTILES) => (event.a, event.b),
            (PROJECTILES, ENEMIES) => (event.b, event.a),
            _ => return,
        };
        world.despawn(enemy);
        world.despawn(projectile);
        if self.enemies.remove(&enemy) {
            self.stats.record_enemy_destroyed();
        }
        self.projectiles.release(projectile);
        debug!(enemy = enemy.0, projectile = projectile.0, "enemy_destroyed");
    }

    /// Reclaims a projectile that left the field.
    pub(crate) fn release_culled(&mut self, id: EntityId, world: &mut SceneWorld) {
        if self.projectiles.release(id) {
            world.despawn(id);
            self.stats.record_culled();
        }
    }
}
