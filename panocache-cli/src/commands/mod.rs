//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`sync`] - One sync pass over the challenge map
//! - [`continuous`] - Sync, then react to file changes until Ctrl-C
//! - [`status`] - Per-challenge cache state without downloading
//! - [`init`] - Configuration initialization

pub mod common;
pub mod continuous;
pub mod init;
pub mod status;
pub mod sync;
