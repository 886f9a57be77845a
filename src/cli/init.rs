use crate::config::Settings;
use crate::Result;
use colored::Colorize;
use dialoguer::Confirm;
use std::path::Path;

/// Write a commented configuration template.
pub fn run(path: Option<&Path>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| Path::new("changelogd.toml"));

    if path.exists() && !force {
        let overwrite = Confirm::new()
            .with_prompt(format!("{} already exists. Overwrite?", path.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("{}", "Aborted, keeping the existing file.".yellow());
            return Ok(());
        }
    }

    std::fs::write(path, Settings::template())?;

    println!("{}", format!("✅ Wrote {}", path.display()).green());
    println!();
    println!(
        "{}",
        "💡 Fill in the [github] and [wiki] sections, then run 'changelogd sync'.".yellow()
    );
    println!(
        "   Credentials can also come from {} and {}.",
        "CHANGELOGD_GITHUB_TOKEN".cyan(),
        "CHANGELOGD_WIKI_TOKEN".cyan()
    );

    Ok(())
}
