use crate::clients::{GithubClient, WikiClient};
use crate::config::Settings;
use crate::reconcile;
use crate::state::RunStateManager;
use crate::Result;
use colored::Colorize;
use std::path::Path;
use std::time::Duration;

/// Run one reconciliation pass.
pub async fn run(config: Option<&Path>, state_dir: Option<&Path>, dry_run: bool) -> Result<()> {
    let settings = Settings::load(config)?;
    settings.validate()?;

    let timeout = Duration::from_secs(settings.sync.request_timeout_secs);
    let source = GithubClient::new(&settings.github.api_base, &settings.github.token, timeout)?;
    let store = WikiClient::new(
        &settings.wiki.base_url,
        &settings.wiki.username,
        &settings.wiki.api_token,
        timeout,
    )?;

    let state_dir = state_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(RunStateManager::default_dir);
    let mut state = RunStateManager::load(&state_dir)?;

    if dry_run {
        println!("{}", "🔍 Dry run: nothing will be written".yellow());
    } else {
        // A dry run never takes the fence; it writes nothing
        state.begin_pass(Duration::from_secs(settings.sync.stale_lock_secs))?;
    }

    println!(
        "{}",
        format!(
            "🔄 Reconciling {}/{} ({}) → page {}",
            settings.github.owner, settings.github.repo, settings.github.branch, settings.wiki.page_id
        )
        .cyan()
    );

    let result = if dry_run {
        reconcile::reconcile_dry_run(&settings, &source, &store).await
    } else {
        reconcile::reconcile(&settings, &source, &store).await
    };

    if !dry_run {
        match &result {
            Ok(outcome) => state.finish_pass("ok", Some(outcome.admitted))?,
            Err(e) => state.finish_pass(&e.to_string(), None)?,
        }
    }

    let outcome = result?;

    for summary in &outcome.summaries {
        println!("   + {}", summary);
    }

    if outcome.admitted == 0 {
        println!("{}", "✅ Changelog already up to date".green());
    } else if dry_run {
        println!(
            "{}",
            format!("📝 Would append {} row(s)", outcome.admitted).yellow()
        );
    } else {
        println!(
            "{}",
            format!(
                "✅ Appended {} row(s), page now at version {}",
                outcome.admitted, outcome.page_version
            )
            .green()
        );
    }

    Ok(())
}
