//! User configuration (`~/.panocache/config.ini`).
//!
//! Settings structs live in [`settings`], constants in [`defaults`],
//! INI parsing in `parser` and serialization in `writer`.
//!
//! # Example
//!
//! ```
//! use panocache::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! assert_eq!(config.fetch.batch_width, 15);
//! assert_eq!(config.sync_config().batch_width, 15);
//! ```

pub mod defaults;
mod file;
mod parser;
pub mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, FetchSettings, LoggingSettings, PathsSettings, WatchSettings};
