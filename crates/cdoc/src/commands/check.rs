//! `cdoc check` command implementation.

use std::fs;
use std::path::PathBuf;

use cdoc_rewriter::{RewriteError, RewriteOptions, fragments, mentions_tag};
use clap::Args;
use rayon::prelude::*;

use super::args::OptionArgs;
use super::files::{InputFile, collect_inputs};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Files or directories to check.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    #[command(flatten)]
    options: OptionArgs,
}

impl CheckArgs {
    /// Execute the check command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.options.load_config()?;

        let inputs = collect_inputs(&self.paths, &config.files)?;
        output.info(&format!(
            "Checking {} files for <{}>",
            inputs.len(),
            config.rewrite.tag
        ));

        let results: Vec<(PathBuf, Result<usize, CliError>)> = inputs
            .par_iter()
            .map(|input| (input.path.clone(), count_file(input, &config.rewrite)))
            .collect();

        let total = results.len();
        let mut with_occurrences = 0;
        let mut failed = 0;
        for (path, result) in results {
            match result {
                Ok(0) => {}
                Ok(count) => {
                    with_occurrences += 1;
                    output.info(&format!("{}: {count} occurrence(s)", path.display()));
                }
                Err(err) => {
                    failed += 1;
                    output.error(&err.to_string());
                }
            }
        }

        if failed > 0 {
            return Err(CliError::Failed { failed, total });
        }

        output.success(&format!(
            "{with_occurrences} of {total} files contain <{}>",
            config.rewrite.tag
        ));
        Ok(())
    }
}

fn count_file(input: &InputFile, options: &RewriteOptions) -> Result<usize, CliError> {
    let source = fs::read_to_string(&input.path).map_err(|source| CliError::File {
        path: input.path.clone(),
        source,
    })?;
    count_occurrences(&source, options).map_err(|source| CliError::Rewrite {
        path: input.path.clone(),
        source,
    })
}

/// Number of top-level occurrences in `source`.
fn count_occurrences(source: &str, options: &RewriteOptions) -> Result<usize, RewriteError> {
    if !mentions_tag(source, &options.tag) {
        return Ok(0);
    }

    let mut stream = fragments(source, options);
    for fragment in stream.by_ref() {
        fragment?;
    }
    Ok(stream.engine().occurrences())
}
