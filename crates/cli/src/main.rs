use std::env;

use clap::Parser;

use querydsl_cli::{run, Command, Context};

/// Manage the configuration of a querydsl project.
#[derive(Debug, Parser)]
struct Args {
    /// The directory holding the configuration. Defaults to the current directory.
    #[arg(long = "context-path", env = "QUERYDSL_CONTEXT_PATH", value_name = "PATH")]
    context_path: Option<std::path::PathBuf>,

    #[command(subcommand)]
    subcommand: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let context_path = match args.context_path {
        Some(path) => path,
        None => env::current_dir()?,
    };
    run(args.subcommand, &Context { context_path }).await
}
