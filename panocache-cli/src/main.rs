//! panocache CLI - Command-line interface
//!
//! Keeps the local panorama tile cache in sync with the challenge map,
//! either once (`sync`) or until interrupted (`continuous`).

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::common::GlobalArgs;

#[derive(Parser)]
#[command(name = "panocache")]
#[command(version = panocache::VERSION)]
#[command(about = "Cache panorama tile pyramids for the challenge map", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync pass over the challenge map and exit
    ///
    /// Partial download failures are reported but do not change the exit code.
    Sync,

    /// Sync, then keep watching the challenge map and the cache for changes
    ///
    /// Runs until interrupted with Ctrl-C.
    Continuous,

    /// Show the cache state of every challenge without downloading
    Status,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sync => commands::sync::run(&cli.global),
        Commands::Continuous => commands::continuous::run(&cli.global),
        Commands::Status => commands::status::run(&cli.global),
        Commands::Init { force } => commands::init::run(&cli.global, force),
    };

    if let Err(e) = result {
        e.exit();
    }
}
