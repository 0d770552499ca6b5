//! CLI runner for common setup and operations.
//!
//! Loads configuration, initializes logging and builds the pipeline so the
//! command handlers only deal with their own work.

use tokio::runtime::Runtime;
use tracing::info;

use panocache::app::PanoCacheApp;
use panocache::config::ConfigFile;
use panocache::logging::{init_logging, LoggingGuard};

use crate::commands::common::{load_config, GlobalArgs};
use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
}

impl CliRunner {
    /// Loads the effective configuration and starts logging.
    pub fn new(args: &GlobalArgs) -> Result<Self, CliError> {
        let config = load_config(args)?;

        let logging_guard = init_logging(
            &config.logging.directory,
            &config.logging.file,
            config.logging.level,
        )
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("panocache v{}", panocache::VERSION);
        info!("panocache CLI: {} command", command);
    }

    /// Multi-threaded runtime for the async pipeline.
    pub fn runtime(&self) -> Result<Runtime, CliError> {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)
    }

    /// Builds the pipeline with the real HTTP client.
    pub fn app(&self) -> Result<PanoCacheApp, CliError> {
        Ok(PanoCacheApp::from_config(&self.config)?)
    }
}
