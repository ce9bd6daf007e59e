use anyhow::{Context, Result};
use clap::Parser;
use snaply::app::{App, AppEvent, View};
use snaply::config::Config;
use snaply::ui;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Get the config directory path (~/.config/snaply/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("snaply"))
}

#[derive(Parser, Debug)]
#[command(name = "snaply", about = "Terminal image discovery client")]
struct Args {
    /// Path to the config file (default: ~/.config/snaply/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed query for the first page load (overrides the config default)
    #[arg(long, value_name = "QUERY")]
    query: Option<String>,

    /// Skip the sign-in screen and open the grid directly
    #[arg(long)]
    no_auth: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log to stderr so tracing output never corrupts the alternate screen
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => {
            let config_dir = get_config_dir()?;
            if !config_dir.exists() {
                std::fs::create_dir_all(&config_dir)
                    .context("Failed to create config directory")?;
            }

            // Config may carry API keys; keep the directory user-only on Unix
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                match std::fs::metadata(&config_dir) {
                    Ok(metadata) => {
                        let mut perms = metadata.permissions();
                        perms.set_mode(0o700);
                        if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
                            tracing::warn!(
                                path = %config_dir.display(),
                                error = %e,
                                "Failed to set config directory permissions to 0700"
                            );
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %config_dir.display(),
                            error = %e,
                            "Failed to read config directory metadata"
                        );
                    }
                }
            }

            config_dir.join("config.toml")
        }
    };

    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    if let Some(query) = args.query {
        config.default_query = query;
    }

    if config.search_key().is_none() {
        eprintln!("Warning: no search access key configured.");
        eprintln!(
            "Set the {} environment variable or add search_access_key to {}",
            snaply::config::SEARCH_KEY_ENV,
            config_path.display()
        );
    }

    let mut app = App::new(config).context("Failed to create application")?;

    if args.no_auth {
        tracing::info!("Skipping sign-in (--no-auth)");
        app.view = View::Browse;
    }

    // Channel for background task completions
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
