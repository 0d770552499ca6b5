//! Application wiring.
//!
//! [`PanoCacheApp`] turns a [`ConfigFile`](crate::config::ConfigFile) into a
//! ready orchestrator (HTTP client, fetcher, store) and exposes the three
//! entry points the CLI needs: one sync pass, a status report and the
//! continuous reactor.
//!
//! # Example
//!
//! ```ignore
//! use panocache::app::PanoCacheApp;
//! use panocache::config::ConfigFile;
//! use panocache::orchestrator::SyncContext;
//!
//! let app = PanoCacheApp::from_config(&ConfigFile::load()?)?;
//! let mut ctx = SyncContext::new();
//! app.sync_once(&mut ctx).await?;
//! ```

mod bootstrap;
mod error;

pub use bootstrap::{ChallengeStatus, PanoCacheApp};
pub use error::AppError;
