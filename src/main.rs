use anyhow::{Context, Result};
use clap::Parser;
use annodoc::cli::{AppContext, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    annodoc::infra::logging::init(cli.log.as_deref())?;

    // Build a context once, pass everywhere
    let here = std::env::current_dir().context("Failed to read the working directory")?;
    let cwd = match cli.cwd {
        Some(dir) => here.join(dir),
        None => here,
    };
    let ctx = AppContext { quiet: cli.quiet, cwd };

    match cli.command {
        Commands::Doc(args) => annodoc::core::doc_run(args, &ctx),
        Commands::Init(args) => annodoc::infra::config::init(args, &ctx),
    }
}
