//! Project management
//!
//! Handles project initialization and wires the engine to the project's
//! state file and clock.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::config::{ProjectConfig, SeedConfig};
use super::{Config, JsonStateStore};
use crate::domain::{RawRotationConfig, Roster, RotationState};
use crate::engine::{Clock, RotationEngine, SystemClock};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Not in a rota project. Run 'rota init' first.")]
    NotInProject,

    #[error("Failed to create project: {0}")]
    CreateFailed(String),
}

/// Settings for a new project
#[derive(Debug, Clone)]
pub struct InitOptions {
    pub members: Vec<String>,
    pub rotation: RawRotationConfig,
    pub utc_offset_minutes: i32,
    /// Rotation anchor; the local "now" when absent
    pub start: Option<DateTime<Utc>>,
}

/// A rota project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let rota_dir = root.join(".rota");

        if !rota_dir.is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Opens the project at `path` or any of its parents
    pub fn discover(path: &Path) -> Result<Self> {
        let root = Config::find_project_root_from(path).ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    pub fn init(root: impl Into<PathBuf>, options: InitOptions) -> Result<Self> {
        let root = root.into();
        let rota_dir = root.join(".rota");
        let config_path = rota_dir.join("config.toml");

        if config_path.exists() {
            return Err(ProjectError::AlreadyExists(root).into());
        }

        let mut project_config = ProjectConfig {
            rotation: options.rotation,
            seed: SeedConfig {
                members: options.members,
                start: options.start,
            },
            ..ProjectConfig::default()
        };
        project_config.clock.utc_offset_minutes = options.utc_offset_minutes;

        // Reject bad settings before anything is written
        let clock = project_config
            .clock()
            .map_err(|e| ProjectError::CreateFailed(e.to_string()))?;
        let rotation = project_config
            .rotation_config()
            .map_err(|e| ProjectError::CreateFailed(e.to_string()))?;
        let start = *project_config.seed.start.get_or_insert_with(|| clock.now());
        let roster = Roster::from_identities(project_config.seed.members.clone(), start);
        RotationState::new(roster, rotation, start)
            .map_err(|e| ProjectError::CreateFailed(e.to_string()))?;

        fs::create_dir_all(&rota_dir).with_context(|| {
            format!("Failed to create .rota directory: {}", rota_dir.display())
        })?;

        let body = toml::to_string_pretty(&project_config)
            .context("Failed to serialize project config")?;
        let content = format!(
            "# rota configuration\n# Edit [seed] before the first run; afterwards the roster lives in state.json\n\n{}",
            body
        );
        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

        let gitignore_path = rota_dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = "# Ignore interrupted writes and writer locks\n*.tmp\n*.lock\n";
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        tracing::info!(root = %root.display(), "initialized rota project");

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .rota directory path
    pub fn rota_dir(&self) -> PathBuf {
        self.root.join(".rota")
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// State store seeded from the project config
    ///
    /// An empty `[seed]` is allowed once state exists; the store then
    /// reports `NotInitialized` only if the state file is missing.
    pub fn state_store(&self) -> Result<JsonStateStore> {
        let store = JsonStateStore::for_project(&self.root);
        if self.config.project.seed.members.is_empty() {
            return Ok(store);
        }

        let seed = self
            .config
            .project
            .seed()
            .context("Failed to build seed roster from config")?;
        Ok(store.with_seed(seed))
    }

    /// Engine over the project's state file and local clock
    pub fn engine(&self) -> Result<RotationEngine<JsonStateStore, SystemClock>> {
        let clock = self.config.project.clock()?;
        Ok(RotationEngine::new(self.state_store()?, clock))
    }
}
