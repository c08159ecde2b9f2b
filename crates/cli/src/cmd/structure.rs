use mdquery_core::cache::StructureEntry;
use mdquery_core::QueryEngine;
use serde::Serialize;

use super::output::{format_time, print_json, truncate};
use crate::StructureArgs;

#[derive(Serialize)]
struct EntryJson<'a> {
    path: &'a str,
    size: u64,
    modified: String,
}

pub fn run(engine: &QueryEngine, args: StructureArgs) {
    let snapshot = match engine.get_structure(args.refresh) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error scanning vault: {}", e);
            std::process::exit(1);
        }
    };

    if args.json {
        let entries: Vec<EntryJson> = snapshot
            .entries()
            .iter()
            .map(|e| EntryJson {
                path: &e.path,
                size: e.size,
                modified: format_time(e.modified),
            })
            .collect();
        print_json(&entries);
    } else {
        print_structure_table(snapshot.entries());
    }
}

fn print_structure_table(entries: &[StructureEntry]) {
    if entries.is_empty() {
        println!("No documents found.");
        return;
    }

    let path_width = entries.iter().map(|e| e.path.chars().count()).max().unwrap_or(4).clamp(4, 60);

    println!("{:<path_width$}  {:>10}  {:<16}", "PATH", "SIZE", "MODIFIED");
    println!("{}", "-".repeat(path_width + 30));

    for entry in entries {
        println!(
            "{:<path_width$}  {:>10}  {:<16}",
            truncate(&entry.path, path_width),
            entry.size,
            format_time(entry.modified)
        );
    }

    println!();
    println!("-- {} documents --", entries.len());
}
