use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    grid::{DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_SIDE},
    ledger::STARTING_MONEY,
    session::{Command, Session, SessionSettings, DEFAULT_HISTORY_LIMIT},
};

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

fn default_starting_money() -> i64 {
    STARTING_MONEY
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default = "default_starting_money")]
    pub starting_money: i64,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("scenario '{0}' must have a grid at least 1x1")]
    EmptyGrid(String),
    #[error("scenario '{name}' grid {width}x{height} exceeds {max} tiles per side", max = MAX_SIDE)]
    GridTooLarge { name: String, width: u32, height: u32 },
    #[error("scenario '{0}' starting money must not be negative")]
    NegativeMoney(String),
    #[error("scenario '{0}' history limit must be greater than zero")]
    NoHistory(String),
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    /// The default 20x15 city with $10000 and nothing scripted.
    pub fn standard() -> Self {
        Self {
            name: "standard".to_string(),
            description: None,
            grid: GridConfig::default(),
            starting_money: default_starting_money(),
            history_limit: default_history_limit(),
            logging: LoggingConfig::default(),
            commands: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ScenarioError::EmptyGrid(self.name.clone()));
        }
        if self.grid.width > MAX_SIDE || self.grid.height > MAX_SIDE {
            return Err(ScenarioError::GridTooLarge {
                name: self.name.clone(),
                width: self.grid.width,
                height: self.grid.height,
            });
        }
        if self.starting_money < 0 {
            return Err(ScenarioError::NegativeMoney(self.name.clone()));
        }
        if self.history_limit == 0 {
            return Err(ScenarioError::NoHistory(self.name.clone()));
        }
        Ok(())
    }

    pub fn settings(&self) -> SessionSettings {
        SessionSettings {
            width: self.grid.width,
            height: self.grid.height,
            starting_money: self.starting_money,
            history_limit: self.history_limit,
        }
    }

    pub fn build_session(&self) -> Session {
        Session::new(self.settings())
    }
}
