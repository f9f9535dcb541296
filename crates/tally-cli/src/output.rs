//! Output formatting helpers.
//!
//! Records go to stdout as JSON, one per line unless pretty-printed.
//! Everything else goes to stderr so list output can be piped.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

/// Print a record as JSON.
pub fn record<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

/// Report where a list stopped and the cursor to resume from.
pub fn list_footer(count: usize, next_cursor: Option<&str>) {
    if count == 0 {
        eprintln!("{}", "No results.".dimmed());
    }
    if let Some(cursor) = next_cursor {
        eprintln!("{} {}", "Next cursor:".dimmed(), cursor);
    }
}

/// Confirm a saved config file.
pub fn saved(path: &str, base_url: Option<&str>) {
    eprintln!("{} Configuration saved", "✓".green());
    eprintln!("{} {}", "Config:".dimmed(), path);
    if let Some(url) = base_url {
        eprintln!("{} {}", "Base URL:".dimmed(), url);
    }
}

/// Print a warning that does not stop the command.
pub fn warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}
