use engine::{Body, EntityId, InputSnapshot, RenderableDesc, RenderableKind, SceneWorld, Transform, Vec2};

use super::config::ArcadeConfig;
use super::types::{Direction, ACTOR_SCALE, PLAYER_TINT};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PlayerState {
    pub(crate) id: EntityId,
    pub(crate) speed: f32,
    /// Last direction the player moved in; `None` until the first move
    /// when the session starts without a facing.
    pub(crate) facing: Option<Direction>,
}

impl PlayerState {
    pub(crate) fn spawn(config: &ArcadeConfig, world: &mut SceneWorld) -> Self {
        let sprite = config
            .initial_facing
            .unwrap_or(Direction::Down)
            .player_sprite();
        let half = config.player_half_size;
        let id = world.spawn_body(
            Transform::at(config.player_start.to_vec2()),
            RenderableDesc {
                kind: RenderableKind::Sprite(sprite.to_string()),
                debug_name: "player",
                scale: ACTOR_SCALE,
                tint: PLAYER_TINT,
            },
            Body {
                half_extents: Vec2::new(half, half),
                group: None,
                collide_world_bounds: true,
                cull_outside_field: false,
            },
        );
        Self {
            id,
            speed: config.player_speed,
            facing: config.initial_facing,
        }
    }
}

/// First held direction in priority order; only one can ever apply.
pub(crate) fn select_direction(input: &InputSnapshot) -> Option<Direction> {
    Direction::PRIORITY
        .into_iter()
        .find(|direction| input.is_down(direction.action()))
}

/// Sets the player's velocity from input. With no direction held the
/// player stops and keeps its previous facing.
pub(crate) fn update_player(player: &mut PlayerState, input: &InputSnapshot, world: &mut SceneWorld) {
    let Some(direction) = select_direction(input) else {
        world.set_velocity(player.id, Vec2::ZERO);
        return;
    };
    world.set_velocity(player.id, direction.unit() * player.speed);
    if player.facing != Some(direction) {
        player.facing = Some(direction);
        world.set_sprite(player.id, direction.player_sprite());
    }
}
