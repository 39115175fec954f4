//! Parsing of engine CLI text output.

use crate::error::{DockhandError, OutputError};

/// Header names that mark the command column of a process listing.
const COMMAND_COLUMNS: &[&str] = &["CMD", "COMMAND", "NAME"];

/// Extract process command names from `top` output.
///
/// The first line is a header and is always discarded. The header is also
/// used to locate the command column: Linux engines print it last (`CMD`),
/// Windows engines print it first (`Name`). Headers naming neither fall back
/// to the first column. Empty lines are skipped.
///
/// # Errors
///
/// Returns `OutputError::Malformed` when the output has no lines at all, or
/// when a non-empty line has no token in the command column.
pub fn parse_process_list(stdout: &str) -> Result<Vec<String>, DockhandError> {
    let mut lines = stdout.lines();
    let Some(header) = lines.next() else {
        return Err(malformed(stdout));
    };
    let column = command_column(header);

    lines
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.split_whitespace()
                .nth(column)
                .map(String::from)
                .ok_or_else(|| malformed(line))
        })
        .collect()
}

/// Extract a single identifier from command output.
///
/// # Errors
///
/// Returns `OutputError::Malformed` when the trimmed output is empty.
pub fn parse_identifier(stdout: &str) -> Result<String, DockhandError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err(malformed(stdout));
    }
    Ok(String::from(trimmed))
}

fn command_column(header: &str) -> usize {
    header
        .split_whitespace()
        .position(|name| {
            COMMAND_COLUMNS
                .iter()
                .any(|candidate| name.eq_ignore_ascii_case(candidate))
        })
        .unwrap_or(0)
}

fn malformed(raw: &str) -> DockhandError {
    DockhandError::from(OutputError::Malformed {
        raw: String::from(raw),
    })
}
