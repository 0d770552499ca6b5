//! Status command - cache state of every challenge, without downloading.

use panocache::app::ChallengeStatus;

use super::common::GlobalArgs;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the status command.
pub fn run(args: &GlobalArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args)?;
    let app = runner.app()?;
    let runtime = runner.runtime()?;

    let Some(statuses) = runtime.block_on(app.status())? else {
        println!(
            "Challenge map not found: {}",
            app.challenges_path().display()
        );
        return Ok(());
    };

    println!("Challenge map: {}", app.challenges_path().display());
    println!("Cache:         {}", runner.config().paths.cache_dir.display());
    println!();

    if statuses.is_empty() {
        println!("No challenges defined.");
        return Ok(());
    }

    for status in &statuses {
        println!("{}", format_status(status));
    }

    let stale = statuses
        .iter()
        .filter(|s| s.staleness.as_ref().is_some_and(|v| v.needs_refresh()))
        .count();
    println!();
    println!("{} challenge(s), {} need refreshing", statuses.len(), stale);

    Ok(())
}

fn format_status(status: &ChallengeStatus) -> String {
    let verdict = match status.staleness {
        Some(ref staleness) => staleness.to_string(),
        None => "no panorama".to_string(),
    };
    let cached_at = match status.cached_at {
        Some(at) => at.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "-".to_string(),
    };
    format!(
        "  {:<40} {:<36} {:>6}/{:<6} {}",
        status.key.to_string(),
        verdict,
        status.present,
        status.expected,
        cached_at
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use panocache::challenge::ChallengeKey;
    use panocache::staleness::Staleness;

    fn status(staleness: Option<Staleness>) -> ChallengeStatus {
        ChallengeStatus {
            key: ChallengeKey::new("europe", "Old Town"),
            panorama_id: Some("abc".to_string()),
            staleness,
            present: 3,
            expected: 10,
            cached_at: None,
        }
    }

    #[test]
    fn test_format_status_shows_verdict_and_counts() {
        let line = format_status(&status(Some(Staleness::Incomplete {
            present: 3,
            expected: 10,
        })));
        assert!(line.contains("europe/Old Town"));
        assert!(line.contains("incomplete (3/10 tiles)"));
        assert!(line.contains("3/10"));
    }

    #[test]
    fn test_format_status_without_panorama() {
        let line = format_status(&status(None));
        assert!(line.contains("no panorama"));
        assert!(line.trim_end().ends_with('-'));
    }
}
