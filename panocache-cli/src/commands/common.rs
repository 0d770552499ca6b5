//! Common arguments and configuration handling shared across CLI commands.

use std::path::PathBuf;

use clap::Args;

use panocache::config::{config_file_path, ConfigFile, MAX_BATCH_WIDTH};
use panocache::logging::LogLevel;

use crate::error::CliError;

/// Options accepted by every command. CLI values take precedence over the
/// config file.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Config file to use instead of ~/.panocache/config.ini
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Compiled challenge map (JSON)
    #[arg(long, global = true)]
    pub challenges: Option<PathBuf>,

    /// Root directory of the tile cache
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Number of tiles downloaded concurrently
    #[arg(long, global = true)]
    pub batch_width: Option<usize>,

    /// Log per-tile and per-batch detail
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Config file this invocation reads and `init` writes.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config_file_path)
    }
}

/// Loads the config file (defaults when absent) and applies CLI overrides.
pub fn load_config(args: &GlobalArgs) -> Result<ConfigFile, CliError> {
    let mut config = ConfigFile::load_from(&args.config_path())?;
    apply_overrides(&mut config, args)?;
    Ok(config)
}

/// Applies CLI overrides on top of a loaded configuration.
pub fn apply_overrides(config: &mut ConfigFile, args: &GlobalArgs) -> Result<(), CliError> {
    if let Some(ref challenges) = args.challenges {
        config.paths.challenges = challenges.clone();
    }
    if let Some(ref cache_dir) = args.cache_dir {
        config.paths.cache_dir = cache_dir.clone();
    }
    if let Some(width) = args.batch_width {
        if width == 0 || width > MAX_BATCH_WIDTH {
            return Err(CliError::Config(format!(
                "--batch-width must be between 1 and {}, got {}",
                MAX_BATCH_WIDTH, width
            )));
        }
        config.fetch.batch_width = width;
    }
    if args.verbose {
        config.logging.level = LogLevel::Verbose;
    }
    Ok(())
}
