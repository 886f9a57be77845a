use crate::state::RunStateManager;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Show the run fence and last-pass telemetry.
pub fn run(state_dir: Option<&Path>, json: bool) -> Result<()> {
    let state_dir = state_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(RunStateManager::default_dir);
    let manager = RunStateManager::load(&state_dir)?;
    let state = manager.state();

    if json {
        println!("{}", serde_json::to_string_pretty(state)?);
        return Ok(());
    }

    println!("{}", "Changelogd status".cyan().bold());
    println!();

    match &state.busy_since {
        Some(since) => println!(
            "   Fence:    {} (since {})",
            "busy".yellow(),
            since.format("%Y-%m-%d %H:%M:%S")
        ),
        None => println!("   Fence:    {}", "idle".green()),
    }

    match &state.last_run_at {
        Some(at) => println!("   Last run: {}", at.format("%Y-%m-%d %H:%M:%S")),
        None => println!("   Last run: never"),
    }

    if let Some(outcome) = &state.last_outcome {
        let shown = if outcome == "ok" {
            outcome.green()
        } else {
            outcome.red()
        };
        println!("   Outcome:  {}", shown);
    }

    if let Some(admitted) = state.last_admitted {
        println!("   Admitted: {}", admitted);
    }

    Ok(())
}
