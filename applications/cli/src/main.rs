//! Encore - playlist admin and public surfaces on the command line

use anyhow::Context;
use clap::{Parser, Subcommand};
use encore_cli::{commands, config::EncoreConfig};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "encore")]
#[command(about = "Curate and play a persistent audio playlist", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./encore.toml if present)
    #[arg(short, long, global = true, env = "ENCORE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an admin session
    Login {
        /// Admin secret (read from stdin when omitted)
        #[arg(short, long)]
        secret: Option<String>,
    },
    /// End the admin session
    Logout,
    /// Upload audio files into the playlist
    Import {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List tracks with annotation previews
    List,
    /// Replace a track's annotation
    Annotate {
        /// Track name
        name: String,
        /// Annotation text; one line per line, blank lines dropped
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,
        /// Read the annotation from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Remove a track
    Remove {
        /// Track name
        name: String,
    },
    /// Remove every track
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Public playlist in play order
    Playlist,
    /// Public view of one track and its annotation
    Show {
        /// Track name
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "encore=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let config = EncoreConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Login { secret } => {
            let input = match secret {
                Some(secret) => secret,
                None => prompt("Admin secret: ")?,
            };
            commands::login(&config, &input, &mut out).await?;
        }
        Commands::Logout => {
            commands::logout(&config, &mut out).await?;
        }
        Commands::Import { files } => {
            let report = commands::import(&config, &files, &mut out).await?;
            if !report.is_complete() {
                anyhow::bail!("{} of {} files failed", report.failed_count(), files.len());
            }
        }
        Commands::List => {
            commands::list(&config, &mut out).await?;
        }
        Commands::Annotate { name, text, file } => {
            let raw = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => io::read_to_string(io::stdin())?,
            };
            commands::annotate(&config, &name, &raw, &mut out).await?;
        }
        Commands::Remove { name } => {
            commands::remove(&config, &name, &mut out).await?;
        }
        Commands::Clear { yes } => {
            let confirm = |count: usize| {
                yes || prompt(&format!("Delete all {count} tracks? This cannot be undone [y/N] "))
                    .map(|answer| answer.eq_ignore_ascii_case("y"))
                    .unwrap_or(false)
            };
            if !commands::clear(&config, confirm, &mut out).await? {
                writeln!(out, "Nothing deleted")?;
            }
        }
        Commands::Playlist => {
            commands::playlist(&config, &mut out).await?;
        }
        Commands::Show { name } => {
            commands::show(&config, &name, &mut out).await?;
        }
    }

    Ok(())
}

fn prompt(message: &str) -> io::Result<String> {
    eprint!("{message}");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
