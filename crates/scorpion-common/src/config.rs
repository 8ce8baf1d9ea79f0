//! Project configuration model and persistence.
//!
//! The project file holds the workloads added so far, the component used
//! for every workload node, and the ordered resource component library.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{BUILTIN_PROFILES, CONFIG_FILE, CONFIG_TEMP_SUFFIX};
use crate::error::{Result, ScorpionError};
use crate::workload::Workload;

#[allow(clippy::expect_used)]
static EXPORTED_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-zA-Z0-9_]*$").expect("valid identifier regex"));

#[allow(clippy::expect_used)]
static PROFILE_ONE_LINER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+)\.([^(.]+)\(([^)]+)\)$").expect("valid profile regex")
});

/// Root configuration of a Scorpion project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Workloads in the order they were first added.
    #[serde(default)]
    pub workloads: Vec<Workload>,
    /// Component instantiated for every workload node.
    #[serde(default)]
    pub default_workload_component: ComponentEntry,
    /// Ordered resource component library; the first match wins.
    #[serde(default)]
    pub resource_components: Vec<ResourceComponentEntry>,
}

/// A Go constructor that provisions one component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEntry {
    /// Go import path, e.g. `github.com/pulumi/pulumi-aws/sdk/v6/go/aws/rds`.
    pub package: String,
    /// Constructor function, e.g. `NewInstance`.
    pub constructor_func: String,
    /// Argument struct type, e.g. `InstanceArgs`.
    pub args_struct: String,
}

/// A resource component library entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceComponentEntry {
    /// Constructor used when this entry matches.
    #[serde(flatten)]
    pub component: ComponentEntry,
    /// Resource type this entry applies to, matched exactly.
    pub resource_type: String,
    /// Pattern matched against the resource class.
    #[serde(default)]
    pub resource_class_regex: String,
    /// Pattern matched against the resource's logical identity.
    #[serde(default)]
    pub resource_id_regex: String,
}

impl ProjectConfig {
    /// Adds a workload, replacing any existing workload with the same name in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the new workload or an existing one has no valid name.
    pub fn upsert_workload(&mut self, workload: Workload) -> Result<()> {
        let name = workload.name()?.to_owned();
        for existing in &mut self.workloads {
            if existing.name()? == name {
                tracing::info!(workload = %name, "replacing workload");
                *existing = workload;
                return Ok(());
            }
        }
        tracing::info!(workload = %name, "adding workload");
        self.workloads.push(workload);
        Ok(())
    }

    /// Validates the default workload component and every library entry.
    ///
    /// # Errors
    ///
    /// Returns the first invalid entry found.
    pub fn validate_components(&self) -> Result<()> {
        validate_component_entry(&self.default_workload_component).map_err(|e| {
            ScorpionError::config(format!(
                "config contains an invalid default workload component entry: {e}"
            ))
        })?;
        for (i, entry) in self.resource_components.iter().enumerate() {
            validate_component_entry(&entry.component).map_err(|e| {
                ScorpionError::config(format!(
                    "config contains an invalid resource component entry ({i}): {e}"
                ))
            })?;
        }
        Ok(())
    }
}

/// Returns the configuration file path inside `dir`.
#[must_use]
pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

/// Loads the project configuration from `dir`.
///
/// Returns the default configuration and `false` when no file exists.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or decoded.
pub fn load_config(dir: &Path) -> Result<(ProjectConfig, bool)> {
    let path = config_path(dir);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no project config found");
            return Ok((ProjectConfig::default(), false));
        }
        Err(e) => {
            return Err(ScorpionError::config(format!(
                "failed to read config file {}: {e}",
                path.display()
            )));
        }
    };
    let config = serde_json::from_str(&content)
        .map_err(|e| ScorpionError::config(format!("failed to decode config file: {e}")))?;
    tracing::debug!(path = %path.display(), "loaded project config");
    Ok((config, true))
}

/// Saves the project configuration into `dir`.
///
/// The file is written to a temporary sibling first and renamed into place.
///
/// # Errors
///
/// Returns an error if encoding, writing, or renaming fails.
pub fn save_config(dir: &Path, config: &ProjectConfig) -> Result<()> {
    let path = config_path(dir);
    let mut temp = path.clone().into_os_string();
    temp.push(CONFIG_TEMP_SUFFIX);
    let temp = PathBuf::from(temp);

    let mut encoded = serde_json::to_string_pretty(config)?;
    encoded.push('\n');
    let written = std::fs::write(&temp, encoded)
        .and_then(|()| std::fs::rename(&temp, &path))
        .map_err(|e| ScorpionError::Io {
            path: path.clone(),
            source: e,
        });
    if written.is_err() {
        let _ = std::fs::remove_file(&temp);
    }
    written?;
    tracing::debug!(path = %path.display(), "saved project config");
    Ok(())
}

/// Checks that a component entry names a plausible Go package and exported identifiers.
///
/// # Errors
///
/// Returns an error describing the first invalid field.
pub fn validate_component_entry(entry: &ComponentEntry) -> Result<()> {
    if !is_import_path(&entry.package) {
        return Err(ScorpionError::config(format!(
            "component contains an invalid package path '{}'",
            entry.package
        )));
    }
    if !EXPORTED_IDENTIFIER.is_match(&entry.constructor_func) {
        return Err(ScorpionError::config(format!(
            "component contains an invalid constructor func identifier '{}'",
            entry.constructor_func
        )));
    }
    if !EXPORTED_IDENTIFIER.is_match(&entry.args_struct) {
        return Err(ScorpionError::config(format!(
            "component contains an invalid args struct identifier '{}'",
            entry.args_struct
        )));
    }
    Ok(())
}

fn is_import_path(path: &str) -> bool {
    const fn is_path_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~' | '+')
    }
    !path.is_empty()
        && path.split('/').all(|elem| {
            !elem.is_empty() && elem != "." && elem != ".." && elem.chars().all(is_path_char)
        })
}

/// Parses a `<package>.<Constructor>(<ArgsType>)` one-liner.
fn parse_profile_one_liner(raw: &str) -> Option<ComponentEntry> {
    let caps = PROFILE_ONE_LINER.captures(raw)?;
    Some(ComponentEntry {
        package: caps[1].to_owned(),
        constructor_func: caps[2].to_owned(),
        args_struct: caps[3].to_owned(),
    })
}

/// Resolves a workload profile, either a builtin alias or a one-liner.
///
/// # Errors
///
/// Returns an error if the profile cannot be parsed.
pub fn workload_component_for_profile(raw: &str) -> Result<ComponentEntry> {
    let expanded = BUILTIN_PROFILES
        .iter()
        .find(|(alias, _)| *alias == raw)
        .map_or(raw, |(_, one_liner)| *one_liner);
    parse_profile_one_liner(expanded).ok_or_else(|| {
        ScorpionError::config(format!("failed to parse '{expanded}' as workload profile"))
    })
}
