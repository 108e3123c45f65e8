use std::time::Duration;

use engine::{CollisionGroup, InputAction, Vec2};
use serde::Deserialize;

pub(crate) const ENEMIES: CollisionGroup = CollisionGroup(1);
pub(crate) const PROJECTILES: CollisionGroup = CollisionGroup(2);

pub(crate) const ENEMY_SPRITE: &str = "enemy";
pub(crate) const PROJECTILE_SPRITE: &str = "bullet";
pub(crate) const BACKDROP_SPRITE: &str = "bg";
pub(crate) const BACKDROP_SCALE: f32 = 2.75;
pub(crate) const ACTOR_SCALE: f32 = 3.0;
pub(crate) const PROJECTILE_SCALE: f32 = 1.0;

pub(crate) const PLAYER_TINT: [u8; 4] = [90, 170, 255, 255];
pub(crate) const ENEMY_TINT: [u8; 4] = [235, 80, 70, 255];
pub(crate) const PROJECTILE_TINT: [u8; 4] = [255, 230, 90, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Sampling order for movement input; the first held direction wins.
    pub(crate) const PRIORITY: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub(crate) fn action(self) -> InputAction {
        match self {
            Direction::Left => InputAction::MoveLeft,
            Direction::Right => InputAction::MoveRight,
            Direction::Up => InputAction::MoveUp,
            Direction::Down => InputAction::MoveDown,
        }
    }

    pub(crate) fn unit(self) -> Vec2 {
        match self {
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
        }
    }

    pub(crate) fn player_sprite(self) -> &'static str {
        match self {
            Direction::Left => "player-left",
            Direction::Right => "player-right",
            Direction::Up => "player-up",
            Direction::Down => "player-down",
        }
    }

    pub(crate) fn as_token(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

pub(crate) fn facing_token(facing: Option<Direction>) -> &'static str {
    facing.map_or("none", Direction::as_token)
}

/// Fixed point and period at which one enemy appears, forever.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SpawnRule {
    pub(crate) point: Vec2,
    pub(crate) interval: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order_is_left_right_up_down() {
        assert_eq!(
            Direction::PRIORITY,
            [
                Direction::Left,
                Direction::Right,
                Direction::Up,
                Direction::Down
            ]
        );
    }

    #[test]
    fn units_are_axis_aligned_and_screen_space() {
        assert_eq!(Direction::Up.unit(), Vec2::new(0.0, -1.0));
        assert_eq!(Direction::Down.unit(), Vec2::new(0.0, 1.0));
        for direction in Direction::PRIORITY {
            assert!((direction.unit().length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn facing_token_covers_none() {
        assert_eq!(facing_token(None), "none");
        assert_eq!(facing_token(Some(Direction::Right)), "right");
    }
}
