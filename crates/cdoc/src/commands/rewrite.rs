//! `cdoc rewrite` command implementation.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use cdoc_rewriter::{RewriteOptions, rewrite};
use clap::Args;
use rayon::prelude::*;
use tracing::info;

use super::args::OptionArgs;
use super::files::{InputFile, collect_inputs};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the rewrite command.
#[derive(Args)]
pub(crate) struct RewriteArgs {
    /// Files or directories to rewrite.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Overwrite input files with the rewritten output.
    #[arg(short, long, conflicts_with = "output")]
    in_place: bool,

    /// Write rewritten files under this directory, mirroring input paths.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    options: OptionArgs,
}

/// Where rewritten files go.
#[derive(Debug)]
enum Destination {
    Stdout,
    InPlace,
    Directory(PathBuf),
}

/// Result of rewriting one file.
#[derive(Debug)]
struct Rewritten {
    path: PathBuf,
    changed: bool,
    content: String,
}

impl RewriteArgs {
    /// Execute the rewrite command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.options.load_config()?;

        let inputs = collect_inputs(&self.paths, &config.files)?;
        if inputs.is_empty() {
            output.warning("No matching files found");
            return Ok(());
        }

        let destination = match (self.in_place, self.output) {
            (true, _) => Destination::InPlace,
            (false, Some(dir)) => {
                check_unique_targets(&inputs)?;
                Destination::Directory(dir)
            }
            (false, None) if inputs.len() == 1 => Destination::Stdout,
            (false, None) => {
                return Err(CliError::Validation(format!(
                    "{} files matched; use --in-place or --output to write them",
                    inputs.len()
                )));
            }
        };

        let results: Vec<Result<Rewritten, CliError>> = inputs
            .par_iter()
            .map(|input| rewrite_file(input, &config.rewrite, &destination))
            .collect();

        if let Destination::Stdout = destination {
            // A single input, so a single result.
            for result in results {
                output.document(&result?.content)?;
            }
            return Ok(());
        }

        report(&output, &destination, results)
    }
}

/// Rewrite one file and write it to `destination` unless that is stdout.
fn rewrite_file(
    input: &InputFile,
    options: &RewriteOptions,
    destination: &Destination,
) -> Result<Rewritten, CliError> {
    let source = fs::read_to_string(&input.path).map_err(|source| CliError::File {
        path: input.path.clone(),
        source,
    })?;
    let content = rewrite(&source, options).map_err(|source| CliError::Rewrite {
        path: input.path.clone(),
        source,
    })?;
    let changed = content != source;

    match destination {
        Destination::Stdout => {}
        Destination::InPlace => {
            if changed {
                write_file(&input.path, &content)?;
                info!(path = %input.path.display(), "rewrote in place");
            }
        }
        Destination::Directory(dir) => {
            let target = dir.join(&input.relative);
            write_file(&target, &content)?;
            info!(path = %input.path.display(), target = %target.display(), "wrote");
        }
    }

    Ok(Rewritten {
        path: input.path.clone(),
        changed,
        content,
    })
}

/// Fail when two inputs would be written to the same output path.
fn check_unique_targets(inputs: &[InputFile]) -> Result<(), CliError> {
    let mut targets: HashMap<&Path, &Path> = HashMap::with_capacity(inputs.len());
    for input in inputs {
        if let Some(first) = targets.insert(&input.relative, &input.path) {
            return Err(CliError::Validation(format!(
                "{} and {} would both be written to {}",
                first.display(),
                input.path.display(),
                input.relative.display()
            )));
        }
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<(), CliError> {
    let to_error = |source| CliError::File {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    fs::write(path, content).map_err(to_error)
}

fn report(
    output: &Output,
    destination: &Destination,
    results: Vec<Result<Rewritten, CliError>>,
) -> Result<(), CliError> {
    let total = results.len();
    let mut changed = 0;
    let mut failed = 0;

    for result in results {
        match result {
            Ok(file) if file.changed => {
                changed += 1;
                output.info(&format!("Rewrote {}", file.path.display()));
            }
            Ok(_) => {}
            Err(err) => {
                failed += 1;
                output.error(&err.to_string());
            }
        }
    }

    if failed > 0 {
        return Err(CliError::Failed { failed, total });
    }

    match destination {
        Destination::Directory(dir) => output.success(&format!(
            "Wrote {total} files to {} ({changed} rewritten)",
            dir.display()
        )),
        _ => output.success(&format!("Rewrote {changed} of {total} files")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "<template>\n  <doc omit-code-slot=\"1\">\n    <b>x</b>\n  </doc>\n</template>\n";
    const EXPECTED: &str = "<template>\n  <demo language=\"html\">\n<template v-slot:result>\n<b>x</b>\n</template>\n</demo>\n</template>\n";

    fn input(dir: &Path, relative: &str, content: &str) -> InputFile {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        InputFile {
            path,
            relative: PathBuf::from(relative),
        }
    }

    fn options() -> RewriteOptions {
        RewriteOptions::new("doc", "demo")
    }

    #[test]
    fn test_rewrite_to_stdout_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = input(dir.path(), "App.vue", SOURCE);

        let result = rewrite_file(&file, &options(), &Destination::Stdout).unwrap();

        assert!(result.changed);
        assert_eq!(result.content, EXPECTED);
        assert_eq!(fs::read_to_string(&file.path).unwrap(), SOURCE);
    }

    #[test]
    fn test_rewrite_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let file = input(dir.path(), "App.vue", SOURCE);

        rewrite_file(&file, &options(), &Destination::InPlace).unwrap();

        assert_eq!(fs::read_to_string(&file.path).unwrap(), EXPECTED);
    }

    #[test]
    fn test_rewrite_into_directory_mirrors_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let file = input(dir.path(), "components/App.vue", SOURCE);

        rewrite_file(
            &file,
            &options(),
            &Destination::Directory(out.path().to_path_buf()),
        )
        .unwrap();

        let written = out.path().join("components/App.vue");
        assert_eq!(fs::read_to_string(written).unwrap(), EXPECTED);
        assert_eq!(fs::read_to_string(&file.path).unwrap(), SOURCE);
    }

    #[test]
    fn test_unchanged_file_is_not_touched_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let file = input(dir.path(), "Plain.vue", "<template><p/></template>\n");

        let result = rewrite_file(&file, &options(), &Destination::InPlace).unwrap();

        assert!(!result.changed);
    }

    #[test]
    fn test_rewrite_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = input(dir.path(), "Broken.vue", "<doc>never closed");

        let err = rewrite_file(&file, &options(), &Destination::InPlace).unwrap_err();

        assert!(matches!(err, CliError::Rewrite { .. }));
        assert!(err.to_string().contains("Broken.vue"));
        assert_eq!(
            fs::read_to_string(&file.path).unwrap(),
            "<doc>never closed"
        );
    }

    #[test]
    fn test_colliding_output_targets_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let first = input(dir.path(), "a/App.vue", SOURCE);
        let second = input(dir.path(), "b/App.vue", SOURCE);
        let colliding = [
            InputFile {
                relative: PathBuf::from("App.vue"),
                ..first
            },
            InputFile {
                relative: PathBuf::from("App.vue"),
                ..second
            },
        ];

        let err = check_unique_targets(&colliding).unwrap_err();

        assert!(matches!(err, CliError::Validation(_)));
        let message = err.to_string();
        assert!(message.contains("App.vue"));
        assert!(message.contains(&colliding[0].path.display().to_string()));
        assert!(message.contains(&colliding[1].path.display().to_string()));
    }

    #[test]
    fn test_distinct_output_targets_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = [
            input(dir.path(), "a/App.vue", SOURCE),
            input(dir.path(), "b/App.vue", SOURCE),
        ];

        assert!(check_unique_targets(&inputs).is_ok());
    }
}
