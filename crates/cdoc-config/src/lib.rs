//! Configuration management for cdoc.
//!
//! Parses `cdoc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [rewrite]
//! tag = "v-component-doc"
//! component = "v-component-doc-prism"
//! language = "html"
//! trim = true
//!
//! [files]
//! extensions = ["vue", "html"]
//! ```
//!
//! CLI settings can be applied during load via [`CliSettings`]. Loader-style
//! resource queries (`?{"tag":"doc"}`) are parsed with [`parse_query`].

use std::path::{Path, PathBuf};

use cdoc_rewriter::RewriteOptions;
use serde::Deserialize;
use tracing::debug;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the target tag.
    pub tag: Option<String>,
    /// Override the component the tag is rewritten to.
    pub component: Option<String>,
    /// Override the highlight language.
    pub language: Option<String>,
    /// Override trimming.
    pub trim: Option<bool>,
    /// Override dedenting.
    pub dedent: Option<bool>,
    /// Override code slot omission.
    pub omit_code_slot: Option<bool>,
    /// Override result slot omission.
    pub omit_result_slot: Option<bool>,
    /// Override the debug echo comment.
    pub debug: Option<bool>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "cdoc.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root rewrite options.
    pub rewrite: RewriteOptions,
    /// Which files the CLI picks up when walking directories.
    pub files: FilesConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// File selection configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Extensions (without the dot) of files to rewrite.
    pub extensions: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["vue".to_owned(), "html".to_owned()],
        }
    }
}

impl FilesConfig {
    /// Whether `path` has one of the configured extensions.
    ///
    /// Comparison ignores ASCII case.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(ext))
            })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file not found at the explicitly given path.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error reading config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Resource query is not valid options JSON.
    #[error("Query parse error: {0}")]
    Query(#[from] serde_json::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Check rewrite options for values the rewriter cannot work with.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] when a tag, component or slot name
/// is empty, or when the tag would be rewritten to itself.
pub fn validate_rewrite(options: &RewriteOptions) -> Result<(), ConfigError> {
    require_non_empty(&options.tag, "rewrite.tag")?;
    require_non_empty(&options.component, "rewrite.component")?;
    require_non_empty(&options.code_slot, "rewrite.code_slot")?;
    require_non_empty(&options.result_slot, "rewrite.result_slot")?;

    if options.tag.eq_ignore_ascii_case(&options.component) {
        return Err(ConfigError::Validation(format!(
            "rewrite.component must differ from rewrite.tag (both are \"{}\")",
            options.tag
        )));
    }

    Ok(())
}

/// Parse rewrite options from a loader resource query.
///
/// The query is a JSON object, optionally prefixed with `?`. Missing keys
/// keep their defaults; an empty query yields the defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Query`] for malformed JSON and
/// [`ConfigError::Validation`] for unusable values.
///
/// # Example
///
/// ```
/// let options = cdoc_config::parse_query(r#"?{"tag":"doc","rewriteToComponent":"demo"}"#).unwrap();
/// assert_eq!(options.tag, "doc");
/// assert_eq!(options.component, "demo");
/// assert_eq!(options.language, "html");
/// ```
pub fn parse_query(query: &str) -> Result<RewriteOptions, ConfigError> {
    let json = query.trim();
    let json = json.strip_prefix('?').unwrap_or(json).trim();

    let options = if json.is_empty() {
        RewriteOptions::default()
    } else {
        serde_json::from_str(json)?
    };

    validate_rewrite(&options)?;
    Ok(options)
}

impl Config {
    /// Load configuration from file.
    ///
    /// If `config_path` is provided, loads from that path (error if not found).
    /// Otherwise, searches for `cdoc.toml` in the current directory and its
    /// parents, falling back to defaults.
    ///
    /// CLI settings are applied last and the result is validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or if
    /// the resulting options are invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Some(path.to_path_buf())
            }
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_config(&cwd)),
        };

        let mut config = match discovered {
            Some(path) => Self::load_from_file(&path)?,
            None => {
                debug!("no {CONFIG_FILENAME} found, using defaults");
                Self::default()
            }
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        let rewrite = &mut self.rewrite;
        if let Some(tag) = &settings.tag {
            rewrite.tag.clone_from(tag);
        }
        if let Some(component) = &settings.component {
            rewrite.component.clone_from(component);
        }
        if let Some(language) = &settings.language {
            rewrite.language.clone_from(language);
        }
        if let Some(trim) = settings.trim {
            rewrite.trim = trim;
        }
        if let Some(dedent) = settings.dedent {
            rewrite.dedent = dedent;
        }
        if let Some(omit) = settings.omit_code_slot {
            rewrite.omit_code_slot = omit;
        }
        if let Some(omit) = settings.omit_result_slot {
            rewrite.omit_result_slot = omit;
        }
        if let Some(debug) = settings.debug {
            rewrite.debug = debug;
        }
    }

    /// Find `cdoc.toml` in `start` or one of its ancestors.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_rewrite(&self.rewrite)?;
        for ext in &self.files.extensions {
            require_non_empty(ext, "files.extensions entry")?;
            if ext.starts_with('.') {
                return Err(ConfigError::Validation(format!(
                    "files.extensions entry \"{ext}\" must not start with a dot"
                )));
            }
        }
        Ok(())
    }
}
