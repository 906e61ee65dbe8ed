///
/// This module implements the CLI interface for txt2slides: command parsing,
/// config resolution and the user-visible invocations.
///
/// All chunking and presentation building lives in the [`txt2slides-core`] crate.
/// This module is strictly glue: it resolves settings, obtains an OAuth token,
/// wires the Google client into the builder and prints the result.
///
/// ## How To Use
/// - For command-line users: `txt2slides setup` once, then
///   `txt2slides create --template-id <ID> < notes.txt`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`txt2slides-core`]: ../../txt2slides-core/
use crate::google::GoogleSlidesClient;
use crate::load_config::{load_config, AppConfig};
use crate::oauth::OAuthClient;
use crate::stdin::read_stdin;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use txt2slides_core::PresentationBuilder;

/// CLI for txt2slides: turn plain text into Google Slides.
#[derive(Parser)]
#[clap(
    name = "txt2slides",
    version,
    about = "Turn plain text from stdin into a Google Slides presentation, one slide per paragraph"
)]
pub struct Cli {
    /// Path to an optional YAML config file
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read text from stdin and create a presentation from it
    Create {
        /// ID of the Google Slides file copied for every new presentation
        #[clap(long, env = "TXT2SLIDES_TEMPLATE_ID")]
        template_id: Option<String>,

        /// Prefix of the new presentation's title
        #[clap(long, default_value = "")]
        title_prefix: String,
    },
    /// Authorise txt2slides with a Google account and cache the token
    Setup,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Setup => {
            tracing::info!(command = "setup", "Starting OAuth setup");
            OAuthClient::new(
                &config.credentials_path,
                &config.token_path,
                true,
                io::stdin().lock(),
            )
            .await?;
            println!("txt2slides setup completed");
            Ok(())
        }
        Commands::Create {
            template_id,
            title_prefix,
        } => {
            let template_id = template_id
                .or_else(|| config.template_id.clone())
                .context(
                    "no template configured: pass --template-id, set TXT2SLIDES_TEMPLATE_ID or template_id in the config file",
                )?;
            tracing::info!(command = "create", template_id = %template_id, "Creating presentation");

            let oauth = OAuthClient::new(
                &config.credentials_path,
                &config.token_path,
                false,
                io::empty(),
            )
            .await?;
            let remote = GoogleSlidesClient::new(oauth.access_token(), config.google_client_config())?;

            let content = read_stdin().context("failed to read standard input")?;
            let builder = PresentationBuilder::new(remote, config.builder_config(&template_id));
            match builder.create_slides(&title_prefix, &content).await {
                Ok(presentation) => {
                    tracing::info!(command = "create", id = %presentation.id, "Presentation created");
                    println!("{}", presentation.location);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "create", stage = %e.stage(), error = %e, "Presentation build failed");
                    Err(e.into())
                }
            }
        }
    }
}
