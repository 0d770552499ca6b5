//! panocache - Local tile cache for panorama guessing challenges
//!
//! For every configured challenge (a panorama id, a pyramid depth and a
//! legacy/modern URL scheme) this library downloads every tile of the image
//! pyramid into a local cache, skips challenges whose cache is already
//! complete, and re-syncs when the challenge map or the cache changes.
//!
//! # High-Level API
//!
//! The [`app`] module wires everything from a configuration file:
//!
//! ```ignore
//! use panocache::app::PanoCacheApp;
//! use panocache::config::ConfigFile;
//! use panocache::orchestrator::SyncContext;
//!
//! let app = PanoCacheApp::from_config(&ConfigFile::load()?)?;
//! let summary = app.sync_once(&mut SyncContext::new()).await?;
//! ```
//!
//! # Components
//!
//! - [`pyramid`]: tile coordinates of a pyramid
//! - [`provider`] and [`fetcher`]: tile URLs, HTTP and retry
//! - [`store`]: tiles and metadata on disk
//! - [`staleness`]: whether a cache entry needs refreshing
//! - [`orchestrator`]: batched per-challenge sync
//! - [`reactor`]: file watching for continuous mode

pub mod app;
pub mod challenge;
pub mod config;
pub mod fetcher;
pub mod logging;
pub mod orchestrator;
pub mod provider;
pub mod pyramid;
pub mod reactor;
pub mod staleness;
pub mod store;

/// Version of the panocache library and CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
