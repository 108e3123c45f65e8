mod collision;
mod config;
mod enemy;
mod fire;
mod player;
mod scene_impl;
mod session;
mod spawn;
mod stats;
mod types;

pub(crate) use config::{resolve_config, ConfigError, ConfigSource};
pub(crate) use scene_impl::ArcadeScene;

#[cfg(test)]
mod tests;
