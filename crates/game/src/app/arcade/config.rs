use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine::{AppPaths, Rect, Vec2};
use serde::Deserialize;
use thiserror::Error;

use super::types::{Direction, SpawnRule};

pub(crate) const CONFIG_ENV_VAR: &str = "ARCADE_CONFIG";
pub(crate) const CONFIG_FILE_NAME: &str = "arcade.json";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read arcade config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse arcade config {origin} at {json_path}: {source}")]
    Parse {
        origin: String,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid arcade config value at {field}: {message}")]
    Invalid { field: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConfigSource {
    Defaults,
    File(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PointConfig {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl PointConfig {
    pub(crate) fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SizeConfig {
    pub(crate) width: f32,
    pub(crate) height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RectConfig {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl RectConfig {
    pub(crate) fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SpawnRuleConfig {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) interval_ms: u64,
}

impl SpawnRuleConfig {
    const fn new(x: f32, y: f32, interval_ms: u64) -> Self {
        Self { x, y, interval_ms }
    }

    pub(crate) fn to_rule(self) -> SpawnRule {
        SpawnRule {
            point: Vec2::new(self.x, self.y),
            interval: Duration::from_millis(self.interval_ms),
        }
    }
}

/// Tuning for one arcade session. Every field is optional in JSON; a
/// missing field keeps its default and `"initial_facing": null` starts
/// the player with no facing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ArcadeConfig {
    pub(crate) field: SizeConfig,
    pub(crate) world_bounds: RectConfig,
    pub(crate) player_start: PointConfig,
    pub(crate) initial_facing: Option<Direction>,
    pub(crate) player_speed: f32,
    pub(crate) enemy_speed: f32,
    pub(crate) projectile_speed: f32,
    pub(crate) projectile_pool_capacity: usize,
    pub(crate) player_half_size: f32,
    pub(crate) enemy_half_size: f32,
    pub(crate) projectile_half_size: f32,
    pub(crate) enemy_growth_warn_step: usize,
    pub(crate) spawn_rules: Vec<SpawnRuleConfig>,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            field: SizeConfig {
                width: 700.0,
                height: 700.0,
            },
            world_bounds: RectConfig {
                x: 75.0,
                y: 75.0,
                width: 550.0,
                height: 550.0,
            },
            player_start: PointConfig { x: 370.0, y: 370.0 },
            initial_facing: Some(Direction::Down),
            player_speed: 155.0,
            enemy_speed: 155.0,
            projectile_speed: 300.0,
            projectile_pool_capacity: 32,
            player_half_size: 24.0,
            enemy_half_size: 24.0,
            projectile_half_size: 4.0,
            enemy_growth_warn_step: 25,
            spawn_rules: vec![
                SpawnRuleConfig::new(700.0, 330.0, 3000),
                SpawnRuleConfig::new(10.0, 330.0, 4000),
                SpawnRuleConfig::new(350.0, 10.0, 3000),
                SpawnRuleConfig::new(370.0, 700.0, 4000),
            ],
        }
    }
}

impl ArcadeConfig {
    pub(crate) fn field_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.field.width, self.field.height)
    }

    pub(crate) fn spawn_rules(&self) -> Vec<SpawnRule> {
        self.spawn_rules
            .iter()
            .map(|rule| rule.to_rule())
            .collect()
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        require_positive("field.width", self.field.width)?;
        require_positive("field.height", self.field.height)?;
        require_finite("world_bounds.x", self.world_bounds.x)?;
        require_finite("world_bounds.y", self.world_bounds.y)?;
        require_positive("world_bounds.width", self.world_bounds.width)?;
        require_positive("world_bounds.height", self.world_bounds.height)?;
        require_finite("player_start.x", self.player_start.x)?;
        require_finite("player_start.y", self.player_start.y)?;
        require_positive("player_speed", self.player_speed)?;
        require_positive("enemy_speed", self.enemy_speed)?;
        require_positive("projectile_speed", self.projectile_speed)?;
        require_positive("player_half_size", self.player_half_size)?;
        require_positive("enemy_half_size", self.enemy_half_size)?;
        require_positive("projectile_half_size", self.projectile_half_size)?;
        if self.projectile_pool_capacity == 0 {
            return Err(invalid("projectile_pool_capacity", "must be at least 1"));
        }
        if self.enemy_growth_warn_step == 0 {
            return Err(invalid("enemy_growth_warn_step", "must be at least 1"));
        }
        for (index, rule) in self.spawn_rules.iter().enumerate() {
            require_finite(&format!("spawn_rules[{index}].x"), rule.x)?;
            require_finite(&format!("spawn_rules[{index}].y"), rule.y)?;
            if rule.interval_ms == 0 {
                return Err(invalid(
                    format!("spawn_rules[{index}].interval_ms"),
                    "must be at least 1",
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.into(),
        message: message.into(),
    }
}

fn require_finite(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("expected a finite number, got {value}")))
    }
}

fn require_positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("expected a positive number, got {value}")))
    }
}

pub(crate) fn parse_config_str(raw: &str, origin: &str) -> Result<ArcadeConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let config = serde_path_to_error::deserialize::<_, ArcadeConfig>(&mut deserializer).map_err(
        |error| {
            let path = error.path().to_string();
            ConfigError::Parse {
                origin: origin.to_string(),
                json_path: if path.is_empty() { ".".to_string() } else { path },
                source: error.into_inner(),
            }
        },
    )?;
    config.validate()?;
    Ok(config)
}

pub(crate) fn load_config_file(path: &Path) -> Result<ArcadeConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_str(&raw, &path.display().to_string())
}

/// `ARCADE_CONFIG` must name a readable file when set; otherwise the
/// project's `assets/base/arcade.json` is used if present.
pub(crate) fn resolve_config(
    paths: &AppPaths,
) -> Result<(ArcadeConfig, ConfigSource), ConfigError> {
    let default_path = paths.assets_dir.join("base").join(CONFIG_FILE_NAME);
    resolve_config_from(env::var_os(CONFIG_ENV_VAR), &default_path)
}

fn resolve_config_from(
    override_path: Option<OsString>,
    default_path: &Path,
) -> Result<(ArcadeConfig, ConfigSource), ConfigError> {
    if let Some(raw) = override_path.filter(|value| !value.is_empty()) {
        let path = PathBuf::from(raw);
        let config = load_config_file(&path)?;
        return Ok((config, ConfigSource::File(path)));
    }
    if default_path.is_file() {
        let config = load_config_file(default_path)?;
        return Ok((config, ConfigSource::File(default_path.to_path_buf())));
    }
    Ok((ArcadeConfig::default(), ConfigSource::Defaults))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_object_parses_to_defaults() {
        let config = parse_config_str("{}", "inline").expect("parse");
        assert_eq!(config, ArcadeConfig::default());
        assert_eq!(config.spawn_rules.len(), 4);
        assert_eq!(config.initial_facing, Some(Direction::Down));
    }

    #[test]
    fn default_spawn_rules_match_fixed_points() {
        let rules = ArcadeConfig::default().spawn_rules();
        let expected = [
            (700.0, 330.0, 3000),
            (10.0, 330.0, 4000),
            (350.0, 10.0, 3000),
            (370.0, 700.0, 4000),
        ];
        for (rule, (x, y, interval_ms)) in rules.iter().zip(expected) {
            assert_eq!(rule.point, Vec2::new(x, y));
            assert_eq!(rule.interval, Duration::from_millis(interval_ms));
        }
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = parse_config_str(
            r#"{ "projectile_pool_capacity": 2, "initial_facing": "left" }"#,
            "inline",
        )
        .expect("parse");
        assert_eq!(config.projectile_pool_capacity, 2);
        assert_eq!(config.initial_facing, Some(Direction::Left));
        assert_eq!(config.player_speed, 155.0);
    }

    #[test]
    fn null_facing_means_none() {
        let config = parse_config_str(r#"{ "initial_facing": null }"#, "inline").expect("parse");
        assert_eq!(config.initial_facing, None);
    }

    #[test]
    fn unknown_nested_field_reports_json_path() {
        let error = parse_config_str(
            r#"{ "spawn_rules": [ { "x": 1, "y": 2, "interval_ms": 10, "jitter": 3 } ] }"#,
            "inline",
        )
        .expect_err("unknown field");
        match error {
            ConfigError::Parse { json_path, .. } => {
                assert!(json_path.starts_with("spawn_rules[0]"), "{json_path}")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrong_type_reports_field_path() {
        let error = parse_config_str(r#"{ "player_speed": "fast" }"#, "arcade.json")
            .expect_err("wrong type");
        match &error {
            ConfigError::Parse { json_path, .. } => assert_eq!(json_path, "player_speed"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(error.to_string().contains("arcade.json"));
    }

    #[test]
    fn bad_facing_token_is_rejected() {
        let error = parse_config_str(r#"{ "initial_facing": "north" }"#, "inline")
            .expect_err("bad facing");
        assert!(matches!(error, ConfigError::Parse { .. }), "{error}");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let error = parse_config_str(
            r#"{ "spawn_rules": [ { "x": 1, "y": 2, "interval_ms": 0 } ] }"#,
            "inline",
        )
        .expect_err("zero interval");
        match error {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "spawn_rules[0].interval_ms"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_positive_speed_is_rejected() {
        let error =
            parse_config_str(r#"{ "enemy_speed": -1 }"#, "inline").expect_err("negative speed");
        assert!(
            matches!(&error, ConfigError::Invalid { field, .. } if field == "enemy_speed"),
            "{error}"
        );
    }

    #[test]
    fn zero_pool_capacity_is_rejected() {
        let error = parse_config_str(r#"{ "projectile_pool_capacity": 0 }"#, "inline")
            .expect_err("zero capacity");
        assert!(matches!(error, ConfigError::Invalid { .. }));
    }

    #[test]
    fn resolve_falls_back_to_defaults_without_file() {
        let temp = TempDir::new().expect("tempdir");
        let (config, source) =
            resolve_config_from(None, &temp.path().join(CONFIG_FILE_NAME)).expect("resolve");
        assert_eq!(config, ArcadeConfig::default());
        assert_eq!(source, ConfigSource::Defaults);
    }

    #[test]
    fn resolve_reads_default_file_when_present() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{ "player_speed": 200 }"#).expect("write config");

        let (config, source) = resolve_config_from(None, &path).expect("resolve");
        assert_eq!(config.player_speed, 200.0);
        assert_eq!(source, ConfigSource::File(path));
    }

    #[test]
    fn override_path_must_exist() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("missing.json");
        let error = resolve_config_from(
            Some(missing.clone().into_os_string()),
            &temp.path().join(CONFIG_FILE_NAME),
        )
        .expect_err("missing override");
        assert!(matches!(error, ConfigError::Read { path, .. } if path == missing));
    }

    #[test]
    fn override_path_wins_over_default_file() {
        let temp = TempDir::new().expect("tempdir");
        let default_path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&default_path, r#"{ "player_speed": 200 }"#).expect("write default");
        let override_path = temp.path().join("fast.json");
        fs::write(&override_path, r#"{ "player_speed": 400 }"#).expect("write override");

        let (config, _) =
            resolve_config_from(Some(override_path.into_os_string()), &default_path)
                .expect("resolve");
        assert_eq!(config.player_speed, 400.0);
    }
}
