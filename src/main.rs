//! docs2email - Turn a word processor web export into an email-safe html body.

mod archive;
mod attachment;
mod clean;
mod cli;
mod config;
mod convert;
mod error;
mod inline;
mod inspect;
mod pipeline;
mod rewrite;
mod sanitize;
mod utils;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use convert::convert_archive;
use error::PipelineError;
use inspect::inspect_archive;
use std::process;

/// Exit status for a failed conversion, distinct from usage and io failures.
const PIPELINE_FAILURE: i32 = 2;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let result = match &cli.command {
        Commands::Convert { archive, .. } => {
            let options = config.pipeline_options()?;
            log!(
                "style";
                "allowed inline styles: {}",
                options.allowed_styles.iter().collect::<Vec<_>>().join(", ")
            );
            convert_archive(archive, &config, &options).map(|_| ())
        }
        Commands::Inspect { archive } => inspect_archive(archive, &config).map(|_| ()),
    };

    if let Err(err) = &result
        && let Some(err) = err.downcast_ref::<PipelineError>()
    {
        log!("error"; "{}: {}", err.category(), err);
        process::exit(PIPELINE_FAILURE);
    }
    result
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if cli.config.exists() {
        Config::from_path(&cli.config)?
    } else {
        Config::default()
    };
    config.update_with_cli(cli);
    config.validate()?;

    Ok(config)
}
