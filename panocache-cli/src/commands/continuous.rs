//! Continuous command - sync, then react to file changes until Ctrl-C.

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::common::GlobalArgs;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the continuous command.
pub fn run(args: &GlobalArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args)?;
    runner.log_startup("continuous");

    let app = runner.app()?;
    let runtime = runner.runtime()?;

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        if handler_token.is_cancelled() {
            // Second Ctrl-C while a pass is still draining
            std::process::exit(130);
        }
        println!();
        println!("Shutting down after the current pass...");
        handler_token.cancel();
    })
    .map_err(|e| CliError::Signal(e.to_string()))?;

    println!(
        "Watching {} and {} (Ctrl-C to stop)",
        runner.config().paths.challenges.display(),
        runner.config().paths.cache_dir.display()
    );

    let ctx = runtime.block_on(app.run_continuous(cancel))?;
    info!(passes = ctx.passes(), "Stopped");
    println!("Stopped after {} pass(es).", ctx.passes());

    Ok(())
}
