use std::time::Duration;

use engine::{
    EntityId, HeadlessDriver, InputAction, InputSnapshot, OverlapEvent, RenderableKind, Scene,
    SceneCommand, SceneWorld, Vec2,
};

use super::config::{ArcadeConfig, SpawnRuleConfig};
use super::scene_impl::ArcadeScene;
use super::session::ArcadeSession;
use super::types::{Direction, ENEMIES, PROJECTILES};

const MS: Duration = Duration::from_millis(1);
const TEN_MS: Duration = Duration::from_millis(10);

fn driver_with(config: ArcadeConfig, fixed_dt: Duration) -> HeadlessDriver<ArcadeScene> {
    HeadlessDriver::new(ArcadeScene::new(config), fixed_dt)
}

fn session(driver: &HeadlessDriver<ArcadeScene>) -> &ArcadeSession {
    driver.scene().session().expect("session started")
}

fn started(config: &ArcadeConfig) -> (ArcadeSession, SceneWorld) {
    let mut world = SceneWorld::default();
    let session = ArcadeSession::start(config, &mut world);
    world.apply_pending();
    (session, world)
}

fn no_rules() -> ArcadeConfig {
    ArcadeConfig {
        spawn_rules: Vec::new(),
        ..ArcadeConfig::default()
    }
}

fn rule(x: f32, y: f32, interval_ms: u64) -> SpawnRuleConfig {
    SpawnRuleConfig { x, y, interval_ms }
}

fn velocity_of(world: &SceneWorld, id: EntityId) -> Vec2 {
    world.find_entity(id).expect("entity").velocity
}

fn assert_close(actual: Vec2, expected: Vec2, tolerance: f32) {
    assert!(
        (actual - expected).length() <= tolerance,
        "actual={actual:?} expected={expected:?}"
    );
}

#[test]
fn load_sets_up_field_timers_and_player() {
    let driver = driver_with(ArcadeConfig::default(), TEN_MS);
    let world = driver.world();
    let session = session(&driver);

    assert_eq!(world.timer_count(), 4);
    assert_eq!(world.entity_count(), 1);
    assert_eq!(world.field().width, 700.0);
    assert_eq!(world.world_bounds().x, 75.0);
    assert_eq!(
        world.backdrop().map(|backdrop| backdrop.sprite_key.as_str()),
        Some("bg")
    );
    assert_eq!(session.player.facing, Some(Direction::Down));
    assert_eq!(world.position(session.player.id), Some(Vec2::new(370.0, 370.0)));
}

#[test]
fn never_moved_player_fires_down_from_start_position() {
    let (mut session, mut world) = started(&ArcadeConfig::default());

    let id = session.fire(&mut world).expect("pool has room");
    world.apply_pending();

    assert_eq!(world.position(id), Some(Vec2::new(370.0, 370.0)));
    assert_eq!(velocity_of(&world, id), Vec2::new(0.0, 300.0));
    assert_eq!(session.stats.projectiles_fired, 1);
}

#[test]
fn fire_after_moving_right_shoots_right() {
    let mut driver = driver_with(no_rules(), TEN_MS);
    driver.step(&[InputAction::MoveRight]);
    driver.step(&[InputAction::Fire]);

    let session = session(&driver);
    assert_eq!(session.player.facing, Some(Direction::Right));
    let projectile = driver
        .world()
        .entities()
        .iter()
        .find(|entity| entity.body.group == Some(PROJECTILES))
        .expect("projectile");
    assert_eq!(projectile.velocity, Vec2::new(300.0, 0.0));
}

#[test]
fn fire_with_no_facing_creates_stationary_projectile() {
    let config = ArcadeConfig {
        initial_facing: None,
        ..no_rules()
    };
    let mut driver = driver_with(config, TEN_MS);
    driver.step(&[InputAction::Fire]);
    driver.run(10, &[]);

    let projectile = driver
        .world()
        .entities()
        .iter()
        .find(|entity| entity.body.group == Some(PROJECTILES))
        .expect("projectile");
    assert_eq!(projectile.velocity, Vec2::ZERO);
    assert_eq!(projectile.transform.position, Vec2::new(370.0, 370.0));
}

#[test]
fn held_fire_yields_one_projectile_per_rising_edge() {
    let mut driver = driver_with(no_rules(), TEN_MS);

    driver.run(5, &[InputAction::Fire]);
    assert_eq!(session(&driver).stats.projectiles_fired, 1);

    driver.run(2, &[]);
    driver.run(3, &[InputAction::Fire]);
    assert_eq!(session(&driver).stats.projectiles_fired, 2);
    assert_eq!(session(&driver).projectiles.active_count(), 2);
}

#[test]
fn spawn_rule_fires_three_times_in_9001ms() {
    let mut driver = driver_with(ArcadeConfig::default(), MS);
    driver.run(9001, &[]);

    let stats = &session(&driver).stats;
    assert_eq!(stats.spawns_by_rule, vec![3, 2, 3, 2]);
    assert_eq!(stats.enemies_spawned, 10);
    assert_eq!(session(&driver).enemies.len(), 10);
    assert_eq!(driver.world().entity_count(), 11);
}

#[test]
fn enemies_appear_at_their_rule_point() {
    let config = ArcadeConfig {
        enemy_speed: 0.001,
        spawn_rules: vec![rule(700.0, 330.0, 3000)],
        ..ArcadeConfig::default()
    };
    let mut driver = driver_with(config, MS);
    driver.run(9001, &[]);

    let session = session(&driver);
    assert_eq!(session.enemies.len(), 3);
    for id in &session.enemies {
        let position = driver.world().position(*id).expect("enemy");
        assert_close(position, Vec2::new(700.0, 330.0), 0.01);
    }
}

#[test]
fn every_enemy_homes_on_player_at_enemy_speed() {
    let (mut session, mut world) = started(&ArcadeConfig::default());
    for rule_index in 0..4 {
        session.spawn_enemy(rule_index, &mut world).expect("enemy");
    }
    world.apply_pending();

    let moved = InputSnapshot::empty().with_action_down(InputAction::MoveLeft, true);
    session.update(&moved, &mut world);

    let player = session.player_position(&world);
    for id in &session.enemies {
        let position = world.position(*id).expect("enemy");
        let expected = (player - position).normalize_or(Vec2::new(1.0, 0.0)) * 155.0;
        assert_close(velocity_of(&world, *id), expected, 1e-3);
    }
}

#[test]
fn spawned_enemy_is_already_moving() {
    let (mut session, mut world) = started(&ArcadeConfig::default());
    let id = session.spawn_enemy(1, &mut world).expect("enemy");
    world.apply_pending();

    let expected = (Vec2::new(370.0, 370.0) - Vec2::new(10.0, 330.0))
        .normalize_or(Vec2::new(1.0, 0.0))
        * 155.0;
    assert_close(velocity_of(&world, id), expected, 1e-3);
}

#[test]
fn unknown_rule_index_spawns_nothing() {
    let (mut session, mut world) = started(&ArcadeConfig::default());
    assert_eq!(session.spawn_enemy(99, &mut world), None);
    assert!(session.enemies.is_empty());
}

#[test]
fn overlap_destroys_exactly_the_reported_pair() {
    let (mut session, mut world) = started(&ArcadeConfig::default());
    let doomed = session.spawn_enemy(0, &mut world).expect("enemy");
    let bystander = session.spawn_enemy(1, &mut world).expect("enemy");
    let projectile = session.fire(&mut world).expect("projectile");
    world.apply_pending();

    session.resolve_collision(
        OverlapEvent {
            a: doomed,
            b: projectile,
            group_a: ENEMIES,
            group_b: PROJECTILES,
        },
        &mut world,
    );
    world.apply_pending();

    assert!(world.find_entity(doomed).is_none());
    assert!(world.find_entity(projectile).is_none());
    assert!(!session.enemies.contains(&doomed));
    assert!(!session.projectiles.contains(projectile));
    assert!(world.find_entity(bystander).is_some());
    assert!(world.find_entity(session.player.id).is_some());
    assert_eq!(session.stats.enemies_destroyed, 1);
}

#[test]
fn one_projectile_can_destroy_several_enemies_in_one_batch() {
    let (mut session, mut world) = started(&ArcadeConfig::default());
    let first = session.spawn_enemy(0, &mut world).expect("enemy");
    let second = session.spawn_enemy(2, &mut world).expect("enemy");
    let projectile = session.fire(&mut world).expect("projectile");
    world.apply_pending();

    for enemy in [first, second] {
        session.resolve_collision(
            OverlapEvent {
                a: enemy,
                b: projectile,
                group_a: ENEMIES,
                group_b: PROJECTILES,
            },
            &mut world,
        );
    }
    world.apply_pending();

    assert!(session.enemies.is_empty());
    assert_eq!(session.stats.enemies_destroyed, 2);
    assert_eq!(world.entity_count(), 1);
}

#[test]
fn projectile_meets_enemy_through_physics() {
    let config = ArcadeConfig {
        initial_facing: Some(Direction::Right),
        spawn_rules: vec![rule(420.0, 370.0, 1000)],
        ..ArcadeConfig::default()
    };
    let mut driver = driver_with(config, TEN_MS);
    driver.run(100, &[]);
    assert_eq!(session(&driver).enemies.len(), 1);

    driver.step(&[InputAction::Fire]);
    driver.run(20, &[]);

    let session = session(&driver);
    assert!(session.enemies.is_empty());
    assert_eq!(session.projectiles.active_count(), 0);
    assert_eq!(session.stats.enemies_destroyed, 1);
    assert_eq!(driver.world().entity_count(), 1);
}

#[test]
fn exhausted_pool_is_silent_and_culling_frees_slots() {
    let config = ArcadeConfig {
        initial_facing: Some(Direction::Up),
        projectile_pool_capacity: 1,
        ..no_rules()
    };
    let mut driver = driver_with(config, TEN_MS);

    driver.step(&[InputAction::Fire]);
    driver.step(&[]);
    driver.step(&[InputAction::Fire]);
    assert_eq!(session(&driver).stats.projectiles_fired, 1);
    assert_eq!(session(&driver).stats.projectiles_dropped, 1);
    assert_eq!(driver.world().entity_count(), 2);

    driver.run(150, &[]);
    assert_eq!(session(&driver).stats.projectiles_culled, 1);
    assert_eq!(session(&driver).projectiles.active_count(), 0);
    assert_eq!(driver.world().entity_count(), 1);

    driver.step(&[InputAction::Fire]);
    assert_eq!(session(&driver).stats.projectiles_fired, 2);
}

#[test]
fn player_is_clamped_but_enemies_are_not() {
    let mut driver = driver_with(ArcadeConfig::default(), TEN_MS);
    driver.run(400, &[InputAction::MoveLeft]);

    let session = session(&driver);
    let player = driver
        .world()
        .find_entity(session.player.id)
        .expect("player");
    assert_eq!(player.transform.position.x, 75.0 + 24.0);
    assert!(!session.enemies.is_empty());
    assert!(driver
        .world()
        .entities()
        .iter()
        .filter(|entity| session.enemies.contains(&entity.id))
        .all(|entity| !entity.body.collide_world_bounds));
}

#[test]
fn facing_change_swaps_player_sprite() {
    let mut driver = driver_with(no_rules(), TEN_MS);
    driver.step(&[InputAction::MoveUp]);

    let player_id = session(&driver).player.id;
    let player = driver.world().find_entity(player_id).expect("player");
    assert_eq!(
        player.renderable.kind,
        RenderableKind::Sprite("player-up".to_string())
    );
}

#[test]
fn quit_input_ends_the_run() {
    let mut driver = driver_with(ArcadeConfig::default(), TEN_MS);
    assert_eq!(driver.run(5, &[InputAction::Quit]), SceneCommand::Quit);
    assert_eq!(driver.ticks(), 1);
}

#[test]
fn debug_title_reports_counts() {
    let mut driver = driver_with(no_rules(), TEN_MS);
    driver.step(&[InputAction::Fire]);

    let title = driver
        .scene()
        .debug_title(driver.world())
        .expect("title");
    assert_eq!(title, "Arcade | enemies 0 | shots 1/32 | destroyed 0");
}

#[test]
fn unload_drops_session_and_enemies() {
    let mut driver = driver_with(ArcadeConfig::default(), TEN_MS);
    driver.run(300, &[]);
    let (scene, mut world) = driver.into_parts();
    world.apply_pending();

    assert!(scene.session().is_none());
    assert_eq!(world.entity_count(), 1);
}
