//! Arguments shared by the rewriting commands.

use std::path::PathBuf;

use clap::Args;
use cdoc_config::{CliSettings, Config};

use crate::error::CliError;

/// Rewrite option overrides.
#[derive(Args)]
pub(crate) struct OptionArgs {
    /// Path to configuration file (default: auto-discover cdoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tag to rewrite (overrides config).
    #[arg(long)]
    tag: Option<String>,

    /// Component the tag is rewritten to (overrides config).
    #[arg(long)]
    component: Option<String>,

    /// Highlight language passed to the component; empty disables it.
    #[arg(long)]
    language: Option<String>,

    /// Keep leading and trailing blank lines in slot content.
    #[arg(long)]
    no_trim: bool,

    /// Keep common indentation in slot content.
    #[arg(long)]
    no_dedent: bool,

    /// Do not generate the code slot.
    #[arg(long)]
    omit_code_slot: bool,

    /// Do not generate the result slot.
    #[arg(long)]
    omit_result_slot: bool,

    /// Append a comment echoing the generated markup.
    #[arg(long)]
    debug: bool,
}

impl OptionArgs {
    /// Load the configuration with these overrides applied.
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        Ok(Config::load(
            self.config.as_deref(),
            Some(&self.cli_settings()),
        )?)
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            tag: self.tag.clone(),
            component: self.component.clone(),
            language: self.language.clone(),
            trim: self.no_trim.then_some(false),
            dedent: self.no_dedent.then_some(false),
            omit_code_slot: self.omit_code_slot.then_some(true),
            omit_result_slot: self.omit_result_slot.then_some(true),
            debug: self.debug.then_some(true),
        }
    }
}
