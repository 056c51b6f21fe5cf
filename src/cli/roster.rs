//! Roster CLI commands

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;

use super::output::Output;
use crate::storage::Project;

#[derive(Subcommand)]
pub enum RosterCommands {
    /// List members in rotation order
    List,

    /// Add a member at the end of the rotation
    Add {
        /// Member identity
        identity: String,
    },

    /// Remove a member from the rotation
    Remove {
        /// Member identity
        identity: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberRow<'a> {
    identity: &'a str,
    joined_date: String,
    current: bool,
}

pub fn run(cmd: RosterCommands, project: &Project, output: &Output) -> Result<()> {
    match cmd {
        RosterCommands::List => list(project, output),
        RosterCommands::Add { identity } => add(project, output, &identity),
        RosterCommands::Remove { identity } => remove(project, output, &identity),
    }
}

fn list(project: &Project, output: &Output) -> Result<()> {
    let state = project.engine()?.state()?;
    let current = state.pointer.current_index();

    let rows: Vec<MemberRow> = state
        .roster
        .iter()
        .enumerate()
        .map(|(i, entry)| MemberRow {
            identity: &entry.identity,
            joined_date: entry.joined.to_rfc3339(),
            current: i == current,
        })
        .collect();

    if output.is_json() {
        output.data(&rows);
        return Ok(());
    }

    for row in &rows {
        let marker = if row.current { "*" } else { " " };
        output.row(&[marker, row.identity, &row.joined_date]);
    }

    Ok(())
}

fn add(project: &Project, output: &Output, identity: &str) -> Result<()> {
    let entry = project.engine()?.add_member(identity)?;

    if output.is_json() {
        output.data(&entry);
    } else {
        output.success(&format!("Added {} to the roster", entry.identity));
    }

    Ok(())
}

fn remove(project: &Project, output: &Output, identity: &str) -> Result<()> {
    let entry = project.engine()?.remove_member(identity)?;

    if output.is_json() {
        output.data(&entry);
    } else {
        output.success(&format!("Removed {} from the roster", entry.identity));
    }

    Ok(())
}
