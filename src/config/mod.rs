//! Converter configuration management for `docs2email.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[archive]` | How the document entry is recognized             |
//! | `[style]`   | Allowed inline styles and the style rule set     |
//! | `[output]`  | Where `convert` writes, minify, manifest         |
//!
//! # Example
//!
//! ```toml
//! [archive]
//! html_suffix = ".html"
//!
//! [style]
//! allowed = ["font-style:italic", "font-weight:700"]
//! stylesheet = "~/mail/newsletter.css"
//!
//! [output]
//! dir = "out"
//! minify = false
//! manifest = true
//! ```
//!
//! The file is optional; every field has a default.

mod archive;
pub mod defaults;
mod error;
mod output;
mod style;

use archive::ArchiveConfig;
use error::ConfigError;
use output::OutputConfig;
use style::StyleConfig;

use crate::clean::AllowedStyles;
use crate::cli::{Cli, Commands};
use crate::inline::StyleRuleSet;
use crate::pipeline::PipelineOptions;
use anyhow::{Context, Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing docs2email.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Document entry recognition
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Style filter and inliner inputs
    #[serde(default)]
    pub style: StyleConfig,

    /// Output settings for `convert`
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        self.config_path = Self::normalize_path(&cli.config);

        if let Commands::Convert { output, minify, .. } = &cli.command {
            Self::update_option(&mut self.output.dir, output.as_ref());
            Self::update_option(&mut self.output.minify, minify.as_ref());
        }

        self.output.dir = Self::expand_path(&self.output.dir);
        self.style.stylesheet = self.style.stylesheet.as_deref().map(Self::expand_path);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Tilde-expand a path and make it absolute
    fn expand_path(path: &Path) -> PathBuf {
        let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
        Self::normalize_path(&expanded)
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.archive.html_suffix.starts_with('.') {
            bail!(ConfigError::Validation(
                "[archive.html_suffix] must start with `.`".into()
            ));
        }

        if let Err(entry) = AllowedStyles::from_declarations(&self.style.allowed) {
            bail!(ConfigError::Validation(format!(
                "[style.allowed] entry `{entry}` must look like `property:value`"
            )));
        }

        match &self.style.stylesheet {
            Some(path) if !path.exists() => {
                bail!(ConfigError::Validation(
                    "[style.stylesheet] not found".into()
                ))
            }
            Some(path) if !path.is_file() => {
                bail!(ConfigError::Validation(
                    "[style.stylesheet] is not a file".into()
                ))
            }
            _ => {}
        }

        Ok(())
    }

    /// Build the constant pipeline inputs: rule set, allowed styles, suffix.
    pub fn pipeline_options(&self) -> Result<PipelineOptions> {
        let rules = match &self.style.stylesheet {
            Some(path) => {
                let css = fs::read_to_string(path)
                    .map_err(|err| ConfigError::Io(path.clone(), err))?;
                StyleRuleSet::parse(&css)
                    .with_context(|| format!("invalid stylesheet `{}`", path.display()))?
            }
            None => StyleRuleSet::builtin().context("invalid built-in stylesheet")?,
        };

        let allowed_styles = AllowedStyles::from_declarations(&self.style.allowed)
            .map_err(|entry| ConfigError::Validation(format!("[style.allowed] `{entry}`")))?;

        Ok(PipelineOptions {
            rules,
            allowed_styles,
            html_suffix: self.archive.html_suffix.clone(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
