use changelogd::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "changelogd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sync merged pull requests into a wiki release-history page", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass
    Sync {
        /// Config file (defaults to ./changelogd.toml, then the user config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding the run fence and last-run telemetry
        #[arg(long)]
        state_dir: Option<PathBuf>,

        /// Compute and print the new rows without writing the page
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the run fence and last-pass telemetry
    Status {
        /// Directory holding the run fence and last-run telemetry
        #[arg(long)]
        state_dir: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a configuration template
    Init {
        /// Target path (defaults to ./changelogd.toml)
        path: Option<PathBuf>,

        /// Overwrite without prompting
        #[arg(short, long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");

    if let Err(e) = runtime.block_on(run_async(cli)) {
        eprintln!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

async fn run_async(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Sync {
            config,
            state_dir,
            dry_run,
        } => {
            changelogd::cli::sync::run(config.as_deref(), state_dir.as_deref(), dry_run).await?;
        }

        Commands::Status { state_dir, json } => {
            changelogd::cli::status::run(state_dir.as_deref(), json)?;
        }

        Commands::Init { path, force } => {
            changelogd::cli::init::run(path.as_deref(), force)?;
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "changelogd", &mut io::stdout());
        }
    }

    Ok(())
}
