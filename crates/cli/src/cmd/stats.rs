use mdquery_core::QueryEngine;
use serde::Serialize;

use super::output::print_json;
use crate::StatsArgs;

#[derive(Serialize)]
struct StatsJson {
    structure_size: usize,
    content_cache_size: usize,
    context_cache_size: usize,
    last_full_scan_age_secs: Option<f64>,
    structure_scans: u64,
}

pub fn run(engine: &QueryEngine, args: StatsArgs) {
    if let Err(e) = engine.get_structure(false) {
        eprintln!("Error scanning vault: {}", e);
        std::process::exit(1);
    }
    let stats = engine.stats();

    if args.json {
        print_json(&StatsJson {
            structure_size: stats.structure_size,
            content_cache_size: stats.content_cache_size,
            context_cache_size: stats.context_cache_size,
            last_full_scan_age_secs: stats.last_full_scan_age.map(|d| d.as_secs_f64()),
            structure_scans: stats.structure_scans,
        });
        return;
    }

    println!("structure_size:     {}", stats.structure_size);
    println!("content_cache_size: {}", stats.content_cache_size);
    println!("context_cache_size: {}", stats.context_cache_size);
    match stats.last_full_scan_age {
        Some(age) => println!("last_full_scan_age: {:.3}s", age.as_secs_f64()),
        None => println!("last_full_scan_age: never"),
    }
    println!("structure_scans:    {}", stats.structure_scans);
}
