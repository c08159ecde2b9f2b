mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand};
use mdquery_core::RenderMode;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "mdq", version, about = "Cached TABLE/LIST/TASK queries over a markdown vault")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    profile: Option<String>,

    /// Query this directory directly instead of the profile's vault_root
    #[arg(long, global = true)]
    vault: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and print resolved settings
    Doctor,

    /// List every document in the vault
    Structure(StructureArgs),

    /// Show the parsed view of one document
    Show(ShowArgs),

    /// Run a TABLE/LIST/TASK query
    Query(QueryArgs),

    /// Scan the vault and print cache statistics
    Stats(StatsArgs),
}

#[derive(Debug, Args)]
pub struct StructureArgs {
    /// Ignore the cached scan
    #[arg(long)]
    pub refresh: bool,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Vault-relative path of the document
    pub path: String,

    /// Also print the body text
    #[arg(long)]
    pub body: bool,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Query text, e.g. 'TABLE status FROM "projects" WHERE priority > 3'
    pub query: String,

    /// Folder that quoted FROM sources are relative to
    #[arg(long, default_value = "")]
    pub base: String,

    /// table, list, count, compact, summary, smart or json
    #[arg(long, default_value = "smart")]
    pub mode: RenderMode,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[arg(long)]
    pub json: bool,
}

fn main() {
    let cli = Cli::parse();
    let (config, profile, vault) =
        (cli.config.as_deref(), cli.profile.as_deref(), cli.vault.as_deref());

    if let Commands::Doctor = cli.command {
        cmd::doctor::run(config, profile, vault);
        return;
    }

    let rc = cmd::load_config(config, profile, vault);
    logging::init(&rc);
    let engine = cmd::open_engine(&rc);

    match cli.command {
        Commands::Doctor => unreachable!("handled above"),
        Commands::Structure(args) => cmd::structure::run(&engine, args),
        Commands::Show(args) => cmd::show::run(&engine, args),
        Commands::Query(args) => cmd::query::run(&engine, args),
        Commands::Stats(args) => cmd::stats::run(&engine, args),
    }
}
