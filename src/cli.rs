use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,  // global --quiet
    pub cwd: PathBuf, // global --cwd, resolved against the process directory
}

#[derive(Parser)]
#[command(name = "annodoc")]
#[command(
    about = "Render Go package documentation as text plus navigation metadata for editor viewers"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Append diagnostics to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Resolve relative import paths and config against this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render package documentation
    Doc(DocArgs),

    /// Initialize an annodoc.toml config file
    Init(InitArgs),
}

#[derive(Debug, Args)]
pub struct DocArgs {
    /// Import paths (`net/http`, `godoc://net/http`, `./pkg`)
    #[arg(required = true, value_name = "IMPORT_PATH")]
    pub paths: Vec<String>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Omit the FILES section
    #[arg(long)]
    pub no_files: bool,

    /// Omit the SUBDIRECTORIES section
    #[arg(long)]
    pub no_subdirs: bool,
}

#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "annodoc",
            "doc",
            "fmt",
            "godoc://io",
            "--no-files",
            "--quiet",
            "--cwd",
            "/tmp",
        ])
        .expect("parse");

        assert!(cli.quiet);
        assert_eq!(cli.cwd, Some(PathBuf::from("/tmp")));
        let Commands::Doc(args) = cli.command else {
            panic!("expected doc");
        };
        assert_eq!(args.paths, ["fmt", "godoc://io"]);
        assert!(args.no_files);
        assert!(!args.no_subdirs);
    }

    #[test]
    fn doc_requires_a_path() {
        assert!(Cli::try_parse_from(["annodoc", "doc"]).is_err());
    }
}
