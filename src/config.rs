/// Grouping configuration loader - parses rowgroup.toml
///
/// Lets a saved key path and output style be reused without retyping them
/// on the command line. Every key is optional; command-line flags override
/// whatever the file says.
///
/// ```toml
/// fields = ["steamid", "website", "id"]
/// key_order = "natural"            # or "first_occurrence", "ascending"
///
/// [output]
/// emit = "flat"                    # or "tree"
/// pretty = true
/// ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::analysis::groupings::{Grouper, KeyOrder};
use crate::error::ConfigError;
use crate::input::SAMPLE_FIELDS;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "rowgroup.toml";

/// Environment variable naming an alternate config file.
pub const CONFIG_ENV_VAR: &str = "ROWGROUP_CONFIG";

/// What the driver writes to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Emit {
    /// The flattened record list.
    #[default]
    Flat,
    /// The nested grouping tree before flattening.
    Tree,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub emit: Emit,
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            emit: Emit::Flat,
            pretty: true,
        }
    }
}

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GrouperConfig {
    /// Grouping key path, outermost first.
    pub fields: Vec<String>,
    pub key_order: KeyOrder,
    pub output: OutputConfig,
}

impl GrouperConfig {
    pub fn grouper(&self) -> Grouper {
        Grouper::new(self.fields.iter().cloned()).with_key_order(self.key_order)
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub fields: Vec<String>,
    pub key_order: Option<KeyOrder>,
    pub emit: Option<Emit>,
    pub compact: bool,
}

/// Everything the driver needs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub grouper: Grouper,
    pub emit: Emit,
    pub pretty: bool,
}

/// Merges command-line overrides into the loaded config.
///
/// Fields come from the command line, else the config file, else (only when
/// grouping the built-in sample) `SAMPLE_FIELDS`. User input with no fields
/// anywhere is grouped by nothing and comes back unchanged.
pub fn resolve_settings(config: &GrouperConfig, overrides: &Overrides, using_sample: bool) -> RunSettings {
    let fields: Vec<String> = if !overrides.fields.is_empty() {
        overrides.fields.clone()
    } else if !config.fields.is_empty() {
        config.fields.clone()
    } else if using_sample {
        SAMPLE_FIELDS.iter().map(|f| f.to_string()).collect()
    } else {
        Vec::new()
    };

    let merged = GrouperConfig {
        fields,
        key_order: overrides.key_order.unwrap_or(config.key_order),
        output: OutputConfig {
            emit: overrides.emit.unwrap_or(config.output.emit),
            pretty: config.output.pretty && !overrides.compact,
        },
    };

    RunSettings {
        grouper: merged.grouper(),
        emit: merged.output.emit,
        pretty: merged.output.pretty,
    }
}

/// Loads a config file. Missing or malformed files are errors.
pub fn load_config(path: &Path) -> Result<GrouperConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves which config file to use and loads it.
///
/// An explicit path (flag or `ROWGROUP_CONFIG`) must exist. The default
/// `rowgroup.toml` is optional; without it the defaults apply.
pub fn resolve_config(explicit: Option<&Path>) -> Result<(GrouperConfig, Option<PathBuf>), ConfigError> {
    if let Some(path) = explicit {
        return Ok((load_config(path)?, Some(path.to_path_buf())));
    }

    let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if default_path.is_file() {
        let config = load_config(&default_path)?;
        Ok((config, Some(default_path)))
    } else {
        Ok((GrouperConfig::default(), None))
    }
}
