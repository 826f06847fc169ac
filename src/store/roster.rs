use std::path::Path;

use thiserror::Error;

use crate::core::{Roster, RosterEntry};

/// Maximum number of roster rows accepted from a single file
pub const MAX_ROSTER_ROWS: usize = 10_000;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("roster I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid roster: {0}")]
    InvalidFormat(String),

    #[error("duplicate roster entry for {0}")]
    Duplicate(String),

    #[error("too many roster rows: limit is {MAX_ROSTER_ROWS}")]
    TooManyRows,
}

/// Parse a roster CSV with columns: id, demand
///
/// # Errors
///
/// Returns `RosterError::Io` if the file cannot be read, or other parse
/// errors if the content is invalid.
pub fn parse_roster_file(path: &Path) -> Result<Roster, RosterError> {
    let content = std::fs::read_to_string(path)?;
    parse_roster_text(&content)
}

/// Parse roster CSV text with columns: id, demand
///
/// A leading header line is optional and detected by its first field
/// (`id`, `email`, `name`, or `participant`). Blank lines and `#` comments
/// are skipped.
///
/// # Errors
///
/// Returns `RosterError::InvalidFormat` for short lines or bad demand
/// values, `RosterError::Duplicate` for a repeated id, or
/// `RosterError::TooManyRows` past the row limit.
pub fn parse_roster_text(text: &str) -> Result<Roster, RosterError> {
    let mut entries: Vec<RosterEntry> = Vec::new();
    let mut first_data_line = true;

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();

        if first_data_line {
            first_data_line = false;
            let first = fields.first().map(|s| s.trim().to_lowercase()).unwrap_or_default();
            if matches!(first.as_str(), "id" | "email" | "name" | "participant") {
                continue;
            }
        }

        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;

        if fields.len() < 2 {
            return Err(RosterError::InvalidFormat(format!(
                "line {line_num} has fewer than 2 fields"
            )));
        }

        let id = fields[0].trim();
        if id.is_empty() {
            return Err(RosterError::InvalidFormat(format!(
                "line {line_num} has an empty id"
            )));
        }

        let demand: u32 = fields[1].trim().parse().map_err(|_| {
            RosterError::InvalidFormat(format!(
                "invalid demand on line {}: '{}'",
                line_num, fields[1]
            ))
        })?;

        if entries.iter().any(|e| e.id.as_str() == id) {
            return Err(RosterError::Duplicate(id.to_string()));
        }

        if entries.len() >= MAX_ROSTER_ROWS {
            return Err(RosterError::TooManyRows);
        }

        entries.push(RosterEntry::new(id, demand));
    }

    Ok(Roster::new(entries))
}

/// Write a roster back out as CSV with a header line
///
/// # Errors
///
/// Returns `RosterError::Io` if the file cannot be written.
pub fn write_roster(path: &Path, roster: &Roster) -> Result<(), RosterError> {
    let mut out = String::from("id,demand\n");
    for entry in roster.iter() {
        out.push_str(&format!("{},{}\n", entry.id, entry.demand));
    }
    std::fs::write(path, out)?;
    Ok(())
}

/// Upsert one participant's demand in a roster file
///
/// # Errors
///
/// Propagates read, parse, and write errors from the underlying file.
pub fn update_entry(path: &Path, id: &str, demand: u32) -> Result<(), RosterError> {
    let mut roster = if path.exists() {
        parse_roster_file(path)?
    } else {
        Roster::default()
    };
    roster.set_demand(id, demand);
    write_roster(path, &roster)
}
