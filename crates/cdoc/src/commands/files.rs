//! Input file discovery.

use std::fs;
use std::path::{Path, PathBuf};

use cdoc_config::FilesConfig;

use crate::error::CliError;

/// A file to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InputFile {
    /// Path as found on disk.
    pub path: PathBuf,
    /// Path relative to the argument it was found under. For file arguments
    /// this is the file name.
    pub relative: PathBuf,
}

/// Expand command line paths into the files to process.
///
/// Files given directly are always included. Directories are walked
/// recursively, skipping hidden entries, and only files matching
/// `files.extensions` are kept. Results are sorted by path.
pub(crate) fn collect_inputs(
    paths: &[PathBuf],
    files: &FilesConfig,
) -> Result<Vec<InputFile>, CliError> {
    let mut inputs = Vec::new();

    for path in paths {
        if path.is_dir() {
            walk_directory(path, Path::new(""), files, &mut inputs)?;
        } else if path.is_file() {
            let relative = path
                .file_name()
                .map_or_else(|| path.clone(), PathBuf::from);
            inputs.push(InputFile {
                path: path.clone(),
                relative,
            });
        } else {
            return Err(CliError::Validation(format!(
                "{} does not exist",
                path.display()
            )));
        }
    }

    inputs.sort_by(|a, b| a.path.cmp(&b.path));
    inputs.dedup_by(|a, b| a.path == b.path);
    Ok(inputs)
}

fn walk_directory(
    dir: &Path,
    prefix: &Path,
    files: &FilesConfig,
    inputs: &mut Vec<InputFile>,
) -> Result<(), CliError> {
    let entries = fs::read_dir(dir).map_err(|source| CliError::File {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name();
        // Skip hidden files/dirs
        if name.to_string_lossy().starts_with('.') {
            continue;
        }

        let path = entry.path();
        let relative = prefix.join(&name);
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            walk_directory(&path, &relative, files, inputs)?;
        } else if files.matches(&path) {
            inputs.push(InputFile { path, relative });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_collect_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("App.vue"));
        touch(&root.join("components/Button.vue"));
        touch(&root.join("components/readme.md"));
        touch(&root.join("pages/index.html"));
        touch(&root.join(".cache/Stale.vue"));
        touch(&root.join("components/.Hidden.vue"));

        let inputs = collect_inputs(&[root.to_path_buf()], &FilesConfig::default()).unwrap();

        let relative: Vec<_> = inputs.iter().map(|i| i.relative.clone()).collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("App.vue"),
                PathBuf::from("components/Button.vue"),
                PathBuf::from("pages/index.html"),
            ]
        );
    }

    #[test]
    fn test_collect_keeps_explicit_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        touch(&file);

        let inputs = collect_inputs(&[file.clone()], &FilesConfig::default()).unwrap();

        assert_eq!(
            inputs,
            vec![InputFile {
                path: file,
                relative: PathBuf::from("notes.txt"),
            }]
        );
    }

    #[test]
    fn test_collect_deduplicates() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("App.vue");
        touch(&file);

        let inputs = collect_inputs(
            &[dir.path().to_path_buf(), file.clone()],
            &FilesConfig::default(),
        )
        .unwrap();

        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].path, file);
    }

    #[test]
    fn test_collect_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.vue");

        let err = collect_inputs(&[missing], &FilesConfig::default()).unwrap_err();

        assert!(matches!(err, CliError::Validation(msg) if msg.contains("does not exist")));
    }
}
