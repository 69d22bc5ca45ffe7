//! Solclone - clone verified contracts into a local project
//!
//! Fetches the verified source of an on-chain contract from a block explorer,
//! reconstructs its file tree inside the project, and exposes the remappings
//! and compiler overrides needed to build it.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use eyre::Result;
use solclone_engine::{Project, DEFAULT_SOURCES_DIR};
use tracing::Level;

mod cmd;

/// Command-line interface for solclone
#[derive(Debug, Parser)]
#[command(name = "solclone")]
#[command(about = "Clone verified contracts from a block explorer into a local project")]
#[command(version)]
pub struct Cli {
    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also write logs to a daily-rolling file under the temp directory
    #[arg(long, global = true)]
    pub log_file: bool,

    /// Project root (default: current directory)
    #[arg(long, env = "SOLCLONE_ROOT", global = true)]
    pub root: Option<PathBuf>,

    /// Sources directory of the build tool, relative to the project root
    #[arg(long, default_value = DEFAULT_SOURCES_DIR, global = true)]
    pub sources: PathBuf,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clone a verified contract into the project
    Clone(cmd::CloneArgs),
    /// Print the import remappings of every cloned contract
    Remappings,
    /// Print the compiler version override of every cloned file
    Overrides,
}

impl Cli {
    fn log_level(&self) -> Level {
        if matches!(&self.command, Commands::Clone(args) if args.quiet) {
            return Level::ERROR;
        }
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    fn project(&self) -> Result<Project> {
        let root = match &self.root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };
        Ok(Project::new(root).with_sources_dir(&self.sources))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    if cli.log_file {
        solclone_common::init_logging("solclone", true)?;
    } else {
        solclone_common::init_simple_logging(cli.log_level())?;
    }

    let project = cli.project()?;
    tracing::debug!(root = %project.root.display(), "using project");

    match &cli.command {
        Commands::Clone(args) => cmd::clone(&project, args).await,
        Commands::Remappings => cmd::remappings(&project),
        Commands::Overrides => cmd::overrides(&project),
    }
}
