use mdquery_core::frontmatter::Frontmatter;
use mdquery_core::render::display_value;
use mdquery_core::vault::{Document, TaskItem};
use mdquery_core::{CacheError, QueryEngine};
use serde::Serialize;
use std::collections::BTreeSet;

use super::output::{format_time, print_json};
use crate::ShowArgs;

#[derive(Serialize)]
struct TaskJson<'a> {
    text: &'a str,
    completed: bool,
    line: usize,
}

#[derive(Serialize)]
struct DocumentJson<'a> {
    path: &'a str,
    size: u64,
    modified: String,
    frontmatter: &'a Frontmatter,
    tags: &'a BTreeSet<String>,
    links: &'a BTreeSet<String>,
    headings: &'a [String],
    tasks: Vec<TaskJson<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
}

pub fn run(engine: &QueryEngine, args: ShowArgs) {
    let doc = match engine.get_content(&args.path) {
        Ok(doc) => doc,
        Err(CacheError::NotFound(path)) => {
            eprintln!("No document at '{}' in the vault.", path);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error reading {}: {}", args.path, e);
            std::process::exit(1);
        }
    };

    if args.json {
        print_json(&DocumentJson {
            path: &doc.path,
            size: doc.size,
            modified: format_time(doc.modified),
            frontmatter: &doc.frontmatter,
            tags: &doc.tags,
            links: &doc.outgoing_links,
            headings: &doc.headings,
            tasks: doc.tasks.iter().map(task_json).collect(),
            body: args.body.then_some(doc.body.as_str()),
        });
    } else {
        print_document(&doc, args.body);
    }
}

fn task_json(task: &TaskItem) -> TaskJson<'_> {
    TaskJson { text: &task.text, completed: task.completed, line: task.line }
}

fn print_document(doc: &Document, with_body: bool) {
    println!("{}", doc.path);
    println!("  size:     {} bytes", doc.size);
    println!("  modified: {}", format_time(doc.modified));

    if !doc.frontmatter.is_empty() {
        println!();
        println!("Frontmatter:");
        for (key, value) in &doc.frontmatter.fields {
            println!("  {}: {}", key, display_value(value));
        }
    }

    print_set("Tags", doc.tags.iter().map(|t| format!("#{}", t)));
    print_set("Links", doc.outgoing_links.iter().cloned());
    print_set("Headings", doc.headings.iter().cloned());

    if !doc.tasks.is_empty() {
        println!();
        println!("Tasks:");
        for task in &doc.tasks {
            let mark = if task.completed { 'x' } else { ' ' };
            println!("  - [{}] {} (line {})", mark, task.text, task.line);
        }
    }

    if with_body {
        println!();
        println!("{}", doc.body.trim_end());
    }
}

fn print_set(label: &str, items: impl Iterator<Item = String>) {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        return;
    }
    println!();
    println!("{} ({}):", label, items.len());
    for item in items {
        println!("  {}", item);
    }
}
