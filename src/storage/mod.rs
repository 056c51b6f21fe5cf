//! # Storage Layer
//!
//! Persistence for rota with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Rotation state | JSON document | `.rota/state.json` |
//! | Config | TOML | `.rota/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`JsonStateStore`] uses file locking (`fs2`): shared on read, and an
//!   exclusive sidecar lock that queues writers
//! - Writes are atomic (temp file + rename), so the pointer and its
//!   last-rotation instant always land together
//!
//! ## Project Structure
//!
//! ```text
//! .rota/
//! ├── config.toml           # Cadence, clock offset, seed roster
//! ├── state.json            # Roster, pointer, anchors (created on first run)
//! ├── state.json.lock       # Writer lock, empty
//! └── .gitignore            # Ignores temp writes and the lock
//! ```
//!
//! ## Key Types
//!
//! - [`StateStore`] - Contract the engine persists through
//! - [`JsonStateStore`] - File-backed store
//! - [`MemoryStore`] - In-process store
//! - [`Project`] - Entry point for accessing a rota project
//! - [`Config`] - Project and global configuration

mod config;
mod json;
mod project;
mod store;

pub use config::{ClockConfig, Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, SeedConfig};
pub use json::JsonStateStore;
pub use project::{InitOptions, Project, ProjectError};
pub use store::{MemoryStore, StateOrigin, StateStore, StoreError};
