use engine::{EntityId, InputSnapshot, OverlapEvent, Scene, SceneCommand, SceneWorld, TimerTag};
use tracing::{info, warn};

use super::config::ArcadeConfig;
use super::session::ArcadeSession;
use super::types::facing_token;

pub(crate) struct ArcadeScene {
    config: ArcadeConfig,
    session: Option<ArcadeSession>,
}

impl ArcadeScene {
    pub(crate) fn new(config: ArcadeConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub(crate) fn session(&self) -> Option<&ArcadeSession> {
        self.session.as_ref()
    }
}

impl Scene for ArcadeScene {
    fn load(&mut self, world: &mut SceneWorld) {
        world.clear();
        let session = ArcadeSession::start(&self.config, world);
        info!(
            spawn_rules = session.rules.len(),
            pool_capacity = session.projectiles.capacity(),
            facing = facing_token(session.player.facing),
            "scene_loaded"
        );
        self.session = Some(session);
    }

    fn update(
        &mut self,
        _fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }
        if let Some(session) = self.session.as_mut() {
            session.update(input, world);
        }
        SceneCommand::None
    }

    fn on_timer(&mut self, tag: TimerTag, world: &mut SceneWorld) {
        if let Some(session) = self.session.as_mut() {
            session.spawn_enemy(tag.0 as usize, world);
        }
    }

    fn on_overlap(&mut self, event: OverlapEvent, world: &mut SceneWorld) {
        if let Some(session) = self.session.as_mut() {
            session.resolve_collision(event, world);
        }
    }

    fn on_left_field(&mut self, entity: EntityId, world: &mut SceneWorld) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.projectiles.contains(entity) {
            session.release_culled(entity, world);
        } else {
            warn!(entity = entity.0, "unexpected_left_field");
        }
    }

    fn render(&mut self, _world: &SceneWorld) {}

    fn unload(&mut self, world: &mut SceneWorld) {
        if let Some(mut session) = self.session.take() {
            session.end(world);
            let stats = &session.stats;
            info!(
                enemies_spawned = stats.enemies_spawned,
                enemies_destroyed = stats.enemies_destroyed,
                projectiles_fired = stats.projectiles_fired,
                projectiles_dropped = stats.projectiles_dropped,
                projectiles_culled = stats.projectiles_culled,
                peak_live_enemies = stats.peak_live_enemies,
                "scene_unloaded"
            );
        }
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        let session = self.session()?;
        Some(format!(
            "Arcade | enemies {} | shots {}/{} | destroyed {}",
            session.enemies.len(),
            session.projectiles.active_count(),
            session.projectiles.capacity(),
            session.stats.enemies_destroyed,
        ))
    }
}
