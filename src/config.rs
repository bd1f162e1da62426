//! Application-level configuration loading, including the match rules.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "RPS_ARENA_BACK_CONFIG_PATH";

const DEFAULT_MAX_TURNS: u32 = 5;
const DEFAULT_ENTRY_WAIT_MS: i64 = 60_000;
const DEFAULT_TURN_PROMPT_MS: i64 = 5_000;
const DEFAULT_FINISHED_MS: i64 = 10_000;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    max_turns: u32,
    entry_wait_ms: i64,
    turn_prompt_ms: i64,
    finished_ms: i64,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        max_turns = app_config.max_turns,
                        "loaded match rules from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Fixed number of turns every match is played over.
    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    /// Advisory wait hint sent to an entrant while the queue has no opponent.
    pub fn entry_wait_ms(&self) -> i64 {
        self.entry_wait_ms
    }

    /// Advisory countdown hint sent with per-turn prompts and results.
    pub fn turn_prompt_ms(&self) -> i64 {
        self.turn_prompt_ms
    }

    /// Advisory display hint sent with the final match summary.
    pub fn finished_ms(&self) -> i64 {
        self.finished_ms
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            entry_wait_ms: DEFAULT_ENTRY_WAIT_MS,
            turn_prompt_ms: DEFAULT_TURN_PROMPT_MS,
            finished_ms: DEFAULT_FINISHED_MS,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    max_turns: Option<u32>,
    entry_wait_ms: Option<i64>,
    turn_prompt_ms: Option<i64>,
    finished_ms: Option<i64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            max_turns: value.max_turns.unwrap_or(DEFAULT_MAX_TURNS).max(1),
            entry_wait_ms: value.entry_wait_ms.unwrap_or(DEFAULT_ENTRY_WAIT_MS),
            turn_prompt_ms: value.turn_prompt_ms.unwrap_or(DEFAULT_TURN_PROMPT_MS),
            finished_ms: value.finished_ms.unwrap_or(DEFAULT_FINISHED_MS),
        }
    }
}

fn resolve_config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}
