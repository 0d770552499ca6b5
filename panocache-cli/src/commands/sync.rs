//! Sync command - one pass over the challenge map.

use tracing::warn;

use panocache::orchestrator::SyncContext;

use super::common::GlobalArgs;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the sync command.
///
/// Tile failures are part of the summary, not an error: only startup and
/// configuration problems produce a non-zero exit.
pub fn run(args: &GlobalArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args)?;
    runner.log_startup("sync");

    let app = runner.app()?;
    let runtime = runner.runtime()?;
    let mut ctx = SyncContext::new();

    match runtime.block_on(app.sync_once(&mut ctx))? {
        Some(summary) => {
            println!("{}", summary);
            if summary.failed > 0 || summary.tiles_succeeded < summary.tiles_total {
                println!("Incomplete cache entries are retried on the next pass.");
            }
        }
        None => {
            warn!(path = %app.challenges_path().display(), "Nothing to sync");
            println!(
                "Challenge map not found: {}",
                app.challenges_path().display()
            );
        }
    }

    Ok(())
}
