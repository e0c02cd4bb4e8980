#![deny(missing_docs)]

//! # Settings
//!
//! Global flags shared by every command, the per-API source selection and
//! the document output format.

use crate::error::{CliError, CliResult};
use crate::repo::ModelRepo;
use apimodel_core::ApiModel;
use serde::Serialize;
use std::path::PathBuf;

/// Default upstream repository holding the service models.
pub const DEFAULT_REPO_URL: &str = "https://github.com/aws/aws-sdk-go";

const APP_NAME: &str = "aws-api-tool";

/// Flags accepted before or after any subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Cache directory root (defaults to `$HOME/.cache/aws-api-tool`).
    #[clap(long, global = true, env = "API_TOOL_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Repository cloned into the cache when no checkout exists yet.
    #[clap(long, global = true, env = "API_TOOL_REPO_URL", default_value = DEFAULT_REPO_URL)]
    pub repo_url: String,

    /// Enable debug logging.
    #[clap(long, global = true)]
    pub debug: bool,
}

impl GlobalArgs {
    /// Resolves the cache directory, falling back to `$HOME/.cache/aws-api-tool`.
    pub fn cache_dir(&self) -> CliResult<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        let home = std::env::var_os("HOME").ok_or_else(|| {
            CliError::General("unable to determine $HOME; pass --cache-dir".to_string())
        })?;
        Ok(PathBuf::from(home).join(".cache").join(APP_NAME))
    }

    /// The model repository, cloned on first use.
    pub fn repo(&self) -> CliResult<ModelRepo> {
        ModelRepo::ensure(&self.cache_dir()?, &self.repo_url)
    }
}

/// Where a per-API command reads its model from.
#[derive(clap::Args, Debug, Clone)]
pub struct ApiSource {
    /// API alias, e.g. `sns` or `eks`.
    pub api: String,

    /// Read the model from this `api-2.json` instead of the repository cache.
    #[clap(long)]
    pub model_file: Option<PathBuf>,

    /// Documentation file to pair with `--model-file`.
    #[clap(long, requires = "model_file")]
    pub docs_file: Option<PathBuf>,
}

impl ApiSource {
    /// Loads the selected API.
    pub fn load(&self, global: &GlobalArgs) -> CliResult<ApiModel> {
        match &self.model_file {
            Some(model_file) => {
                tracing::debug!(api = %self.api, path = ?model_file, "loading model from file");
                Ok(ApiModel::load(
                    self.api.as_str(),
                    model_file,
                    self.docs_file.as_deref(),
                )?)
            }
            None => global.repo()?.model(&self.api),
        }
    }
}

/// Serialization format for documents.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// YAML.
    #[default]
    Yaml,
    /// Pretty-printed JSON.
    Json,
}

impl Format {
    /// Serializes `value`; the result always ends with a newline.
    pub fn render<T: Serialize + ?Sized>(self, value: &T) -> CliResult<String> {
        let mut text = match self {
            Format::Yaml => serde_yaml::to_string(value)?,
            Format::Json => serde_json::to_string_pretty(value)?,
        };
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Ok(text)
    }
}
