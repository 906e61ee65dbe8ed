/// `load_config` module: loads the optional YAML config file into [`AppConfig`].
///
/// This module is the only place where user-supplied YAML is parsed and mapped to
/// typed settings for the CLI and the core builder.
///
/// # Responsibilities
/// - Parse the config file; every key is optional and falls back to a default
/// - Map the `slides` section onto [`txt2slides_core::BuilderConfig`]
/// - Map the `api` section onto [`crate::google::GoogleClientConfig`]
/// - Produce clear diagnostics on read or parse failures
///
/// # Errors
/// All errors in this module use `anyhow::Error` and are surfaced at the CLI boundary.
///
use crate::google::{GoogleClientConfig, DRIVE_API_BASE, SLIDES_API_BASE};
use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use txt2slides_core::builder::DEFAULT_LAYOUT;
use txt2slides_core::{BuilderConfig, InsertionOrder, TrailingChunk};

pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";
pub const DEFAULT_TOKEN_PATH: &str = "token.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// OAuth client secret downloaded from the Google Cloud console.
    pub credentials_path: PathBuf,
    /// Where the OAuth token is cached between runs.
    pub token_path: PathBuf,
    pub template_id: Option<String>,
    pub slides: SlidesSection,
    pub api: ApiSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
            template_id: None,
            slides: SlidesSection::default(),
            api: ApiSection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlidesSection {
    pub layout: String,
    pub insertion_order: InsertionOrder,
    pub trailing_chunk: TrailingChunk,
    pub rollback_on_failure: bool,
    /// Leave slides of empty chunks untouched instead of inserting `""`.
    pub skip_empty_chunks: bool,
}

impl Default for SlidesSection {
    fn default() -> Self {
        SlidesSection {
            layout: DEFAULT_LAYOUT.to_string(),
            insertion_order: InsertionOrder::default(),
            trailing_chunk: TrailingChunk::default(),
            rollback_on_failure: false,
            skip_empty_chunks: false,
        }
    }
}

/// Base URLs of the Google APIs, e.g. for a proxy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiSection {
    pub drive_base_url: String,
    pub slides_base_url: String,
}

impl Default for ApiSection {
    fn default() -> Self {
        ApiSection {
            drive_base_url: DRIVE_API_BASE.to_string(),
            slides_base_url: SLIDES_API_BASE.to_string(),
        }
    }
}

impl AppConfig {
    /// Builder settings for the given template.
    pub fn builder_config(&self, template_id: &str) -> BuilderConfig {
        BuilderConfig {
            template_id: template_id.to_string(),
            layout: self.slides.layout.clone(),
            insertion_order: self.slides.insertion_order,
            trailing_chunk: self.slides.trailing_chunk,
            rollback_on_failure: self.slides.rollback_on_failure,
            skip_empty_chunks: self.slides.skip_empty_chunks,
        }
    }

    /// Google client settings with the configured base URLs.
    pub fn google_client_config(&self) -> GoogleClientConfig {
        GoogleClientConfig {
            drive_base_url: self.api.drive_base_url.clone(),
            slides_base_url: self.api.slides_base_url.clone(),
            ..GoogleClientConfig::default()
        }
    }
}

/// Loads a YAML config file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file deserialises to `null`, which should mean "all defaults".
    if config_content.trim().is_empty() {
        return Ok(AppConfig::default());
    }

    match serde_yaml::from_str::<AppConfig>(&config_content) {
        Ok(conf) => {
            info!(
                config_path = ?path_ref,
                template_set = conf.template_id.is_some(),
                "Parsed config YAML successfully"
            );
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}
