//! Shared output formatting for commands.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::time::SystemTime;

pub fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format("%Y-%m-%d %H:%M").to_string()
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serialising output: {}", e);
            std::process::exit(1);
        }
    }
}

/// Truncate string with ellipsis if needed.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars > 3 {
        format!("{}...", s.chars().take(max_chars - 3).collect::<String>())
    } else {
        s.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate("notes/a.md", 20), "notes/a.md");
        assert_eq!(truncate("projects/long-name.md", 10), "project...");
        assert_eq!(truncate("ééééé", 2), "éé");
    }
}
