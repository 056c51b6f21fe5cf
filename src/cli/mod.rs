//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup | `init`, `validate` |
//! | Duty | Who is on call | `current`, `skip`, `set`, `notify` |
//! | Preview | Looking ahead | `schedule`, `on`, `period` |
//! | Roster | Membership | `roster list`, `roster add`, `roster remove` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Repeat `-v` for more log output on stderr:
//! ```bash
//! rota -vv current
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod roster;
mod rotation;

pub use app::{run, Cli, Commands};
pub use output::{describe_period, Output, OutputFormat};
pub use rotation::parse_date;
