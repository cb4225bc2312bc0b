use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    runtime: RuntimeConfig,
    #[serde(default)]
    paths: PathsConfig,
}

#[derive(Deserialize, Default)]
struct RuntimeConfig {
    queue_capacity: Option<usize>,
    buffer_period_ms: Option<u64>,
    command_timeout_ms: Option<u64>,
}

#[derive(Deserialize, Default)]
struct PathsConfig {
    learn_table: Option<PathBuf>,
}

pub struct Config {
    runtime: RuntimeConfig,
    paths: PathsConfig,
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("beltane").join("config.toml"))
}

fn merge_runtime(base: &mut RuntimeConfig, user: RuntimeConfig) {
    if user.queue_capacity.is_some() {
        base.queue_capacity = user.queue_capacity;
    }
    if user.buffer_period_ms.is_some() {
        base.buffer_period_ms = user.buffer_period_ms;
    }
    if user.command_timeout_ms.is_some() {
        base.command_timeout_ms = user.command_timeout_ms;
    }
}

impl Config {
    pub fn load() -> Config {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");

        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => {
                            merge_runtime(&mut base.runtime, user.runtime);
                            if user.paths.learn_table.is_some() {
                                base.paths.learn_table = user.paths.learn_table;
                            }
                        }
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        Config {
            runtime: base.runtime,
            paths: base.paths,
        }
    }

    pub fn queue_capacity(&self) -> usize {
        self.runtime.queue_capacity.unwrap_or(64)
    }

    pub fn buffer_period(&self) -> Duration {
        Duration::from_millis(self.runtime.buffer_period_ms.unwrap_or(4))
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.runtime.command_timeout_ms.unwrap_or(500))
    }

    pub fn learn_table_path(&self) -> PathBuf {
        self.paths.learn_table.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("beltane")
                .join("learned.json")
        })
    }
}
