//! Configuration handling for rota
//!
//! Configuration is stored in `.rota/config.toml` (project) and
//! `~/.config/rota/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{RawRotationConfig, RotationConfig, RotationSeed};
use crate::engine::SystemClock;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Initial roster used the first time the rotation state is loaded
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SeedConfig {
    /// Members in rotation order
    pub members: Vec<String>,

    /// Rotation anchor (defaults to the first load)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
}

/// Clock settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ClockConfig {
    /// Minutes east of UTC used to decide when a calendar day begins
    pub utc_offset_minutes: i32,
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Periods shown by `rota schedule` without `-n`
    pub schedule_periods: u32,

    /// Rotation cadence
    pub rotation: RawRotationConfig,

    /// Clock settings
    pub clock: ClockConfig,

    /// First-load roster
    pub seed: SeedConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            schedule_periods: 4,
            rotation: RawRotationConfig::default(),
            clock: ClockConfig::default(),
            seed: SeedConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Validated rotation config, listing every problem on failure
    pub fn rotation_config(&self) -> Result<RotationConfig, ConfigError> {
        let violations = self.rotation.violations();
        if !violations.is_empty() {
            let messages: Vec<String> = violations.iter().map(ToString::to_string).collect();
            return Err(ConfigError::Invalid(messages.join("; ")));
        }
        RotationConfig::try_from(self.rotation.clone())
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Seed built from `[seed]` and `[rotation]`
    pub fn seed(&self) -> Result<RotationSeed, ConfigError> {
        if self.seed.members.is_empty() {
            return Err(ConfigError::Invalid(
                "seed.members must list at least one member".to_string(),
            ));
        }

        let mut seed = RotationSeed::new(self.seed.members.clone(), self.rotation_config()?);
        if let Some(start) = self.seed.start {
            seed = seed.starting_at(start);
        }
        Ok(seed)
    }

    /// Wall clock shifted by `clock.utc_offset_minutes`
    pub fn clock(&self) -> Result<SystemClock, ConfigError> {
        let minutes = self.clock.utc_offset_minutes;
        SystemClock::with_offset_minutes(minutes).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "clock.utc_offset_minutes = {} must be within a day of UTC",
                minutes
            ))
        })
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "rota", "rota-cli").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(".rota").join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")
    }

    /// Finds the project root by looking for a `.rota/` directory
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(".rota").is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Finds the project root starting from the current directory
    pub fn find_project_root() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::find_project_root_from(&cwd)
    }

    /// Returns the project root, or an error if not in a project
    pub fn require_project_root(&self) -> Result<&Path> {
        self.project_root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not in a rota project. Run 'rota init' first."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Frequency;
    use chrono::Weekday;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = ProjectConfig::default();
        assert_eq!(config.schedule_periods, 4);
        assert_eq!(
            config.rotation_config().unwrap(),
            RotationConfig::weekly(Weekday::Mon)
        );
        assert_eq!(GlobalConfig::default().default_format, OutputFormat::Text);
    }

    #[test]
    fn parse_project_config() {
        let toml = r#"
schedule_periods = 6

[rotation]
frequency = "biweekly"
week_start_day = 3

[clock]
utc_offset_minutes = -300

[seed]
members = ["alice", "bob"]
start = "2024-01-03T00:00:00Z"
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.schedule_periods, 6);
        assert_eq!(
            config.rotation_config().unwrap().frequency(),
            Frequency::BiWeekly {
                week_start: Weekday::Wed
            }
        );
        assert_eq!(config.clock().unwrap().offset().local_minus_utc(), -300 * 60);

        let seed = config.seed().unwrap();
        assert_eq!(seed.members, vec!["alice", "bob"]);
        assert!(seed.start.is_some());
    }

    #[test]
    fn invalid_rotation_lists_every_problem() {
        let toml = r#"
[rotation]
frequency = "custom"
interval = 0
month_day = 40
"#;
        let config: ProjectConfig = toml::from_str(toml).unwrap();
        let err = config.rotation_config().unwrap_err().to_string();
        assert!(err.contains("interval"), "{}", err);
        assert!(err.contains("month_day"), "{}", err);
    }

    #[test]
    fn seed_requires_members() {
        let config = ProjectConfig::default();
        assert!(matches!(config.seed(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn clock_offset_out_of_range() {
        let mut config = ProjectConfig::default();
        config.clock.utc_offset_minutes = 1500;
        assert!(config.clock().is_err());
    }

    #[test]
    fn parse_global_config() {
        let toml = r#"
default_format = "json"
"#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
    }

    #[test]
    fn find_project_root_walks_up() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".rota")).unwrap();

        let sub_dir = dir.path().join("sub").join("dir");
        fs::create_dir_all(&sub_dir).unwrap();

        let root = Config::find_project_root_from(&sub_dir);
        assert_eq!(root.as_deref(), Some(dir.path()));
    }

    #[test]
    fn config_not_in_project() {
        let config = Config {
            project: ProjectConfig::default(),
            global: GlobalConfig::default(),
            project_root: None,
        };

        assert!(config.require_project_root().is_err());
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut config = ProjectConfig::default();
        config.seed.members = vec!["alice".to_string()];
        let text = toml::to_string_pretty(&config).unwrap();
        let back: ProjectConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
