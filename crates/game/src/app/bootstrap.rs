use engine::{resolve_app_paths, LoopConfig, Scene, StartupError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::arcade::{self, ConfigError, ConfigSource};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    info!("=== Arcade Startup ===");

    let paths = resolve_app_paths()?;
    let (arcade_config, source) = arcade::resolve_config(&paths)?;
    match &source {
        ConfigSource::Defaults => info!("arcade_config_defaults"),
        ConfigSource::File(path) => info!(path = %path.display(), "arcade_config_loaded"),
    }

    let field = arcade_config.field;
    let config = LoopConfig {
        window_title: "Arcade".to_string(),
        window_width: field.width.round().max(1.0) as u32,
        window_height: field.height.round().max(1.0) as u32,
        asset_root: Some(paths.assets_dir),
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        scene: Box::new(arcade::ArcadeScene::new(arcade_config)),
    })
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
