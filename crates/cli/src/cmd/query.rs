use mdquery_core::{QueryEngine, RenderMode};

use crate::QueryArgs;

/// Run one query and print it in the requested mode.
///
/// Failed queries go to stderr with exit code 1, except in `json` mode where
/// the error is part of the serialised result.
pub fn run(engine: &QueryEngine, args: QueryArgs) {
    let result = engine.execute_query(&args.query, &args.base);
    let rendered = engine.render_results(&result, args.mode);

    if !result.is_ok() && args.mode != RenderMode::Json {
        eprint!("{}", rendered);
        std::process::exit(1);
    }

    print!("{}", rendered);
    if !rendered.ends_with('\n') {
        println!();
    }

    if result.skipped > 0 {
        eprintln!("warning: {} documents could not be read and were skipped", result.skipped);
    }
}
