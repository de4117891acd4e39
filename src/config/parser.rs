//! Values parser for loading and layering chart values.
//!
//! Values come from one or more YAML files, then environment variables, then
//! `--set` expressions, later sources winning. Layering happens on the
//! untyped YAML tree so a partial file only replaces the keys it names.

use crate::error::{ConfigError, GuardError, Result};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::values::ChartValues;

/// Environment variables that override single values keys.
pub const ENV_OVERRIDES: &[(&str, &[&str])] = &[
    ("MEDPLUM_CLOUD_PROVIDER", &["cloudProvider"]),
    ("MEDPLUM_GCP_PROJECT_ID", &["gcp", "projectId"]),
    ("MEDPLUM_GCP_SECRET_ID", &["gcp", "secretId"]),
    ("MEDPLUM_INGRESS_DOMAIN", &["ingress", "domain"]),
];

/// Parser for loading chart values.
#[derive(Debug, Default)]
pub struct ValuesParser {
    /// Base path for locating the `.env` file.
    base_path: Option<PathBuf>,
}

impl ValuesParser {
    /// Creates a new values parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path used to locate `.env`.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads values from a single YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ChartValues> {
        let path = path.as_ref();
        let document = read_document(path)?;
        into_values(document, Some(path))
    }

    /// Parses values from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or has the wrong shape.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<ChartValues> {
        debug!("Parsing YAML values");
        let document = parse_document(content, source)?;
        into_values(document, source)
    }

    /// Loads and layers several values files, then applies overrides.
    ///
    /// Files are deep-merged left to right. Each file is checked against the
    /// values schema on its own first, so a type error names the file it came
    /// from. Environment overrides are applied next, then each `--set`
    /// expression in order.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be loaded, an override is
    /// malformed, or the merged document does not match the values schema.
    pub fn load_layered(&self, paths: &[PathBuf], overrides: &[String]) -> Result<ChartValues> {
        let mut merged = Value::Mapping(Mapping::new());

        for path in paths {
            let document = read_document(path)?;
            into_values(document.clone(), Some(path))?;
            merge_values(&mut merged, document);
        }

        apply_env_overrides(&mut merged, |name| std::env::var(name).ok());

        for expression in overrides {
            apply_set_override(&mut merged, expression)?;
        }

        // Files are already known-good, so a failure here comes from an override.
        into_values(merged, None)
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                GuardError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Reads one file into an untyped YAML tree.
fn read_document(path: &Path) -> Result<Value> {
    info!("Loading values from: {}", path.display());

    if !path.exists() {
        return Err(not_found(path));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        GuardError::Config(ConfigError::ParseError {
            message: format!("Failed to read file: {e}"),
            location: Some(path.display().to_string()),
        })
    })?;

    parse_document(&content, Some(path))
}

fn not_found(path: &Path) -> GuardError {
    GuardError::Config(ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// Parses YAML text, treating an empty document as an empty mapping.
fn parse_document(content: &str, source: Option<&Path>) -> Result<Value> {
    let document: Value = serde_yaml::from_str(content).map_err(|e| {
        GuardError::Config(ConfigError::ParseError {
            message: format!("YAML parse error: {e}"),
            location: source.map(|p| p.display().to_string()),
        })
    })?;

    match document {
        Value::Null => Ok(Value::Mapping(Mapping::new())),
        Value::Mapping(_) => Ok(document),
        _ => Err(GuardError::Config(ConfigError::ParseError {
            message: String::from("Values document must be a mapping at the top level"),
            location: source.map(|p| p.display().to_string()),
        })),
    }
}

/// Deserializes a merged tree into typed values.
fn into_values(document: Value, source: Option<&Path>) -> Result<ChartValues> {
    serde_yaml::from_value(document).map_err(|e| {
        GuardError::Config(ConfigError::ParseError {
            message: format!("Invalid values: {e}"),
            location: source.map(|p| p.display().to_string()),
        })
    })
}

/// Deep-merges `overlay` into `base`.
///
/// Mappings merge key by key; any other overlay value replaces the base.
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Applies environment overrides from `lookup` (normally `std::env::var`).
pub fn apply_env_overrides<F>(document: &mut Value, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for (name, path) in ENV_OVERRIDES {
        if let Some(value) = lookup(name) {
            debug!("Overriding {} from environment", path.join("."));
            let segments: Vec<String> = path.iter().map(|s| (*s).to_string()).collect();
            set_path(document, &segments, Value::String(value));
        }
    }
}

/// Applies one `path.to.key=value` expression.
///
/// A backslash escapes a literal dot inside a key
/// (`serviceAccount.annotations.iam\.gke\.io/gcp-service-account=...`).
///
/// # Errors
///
/// Returns `InvalidOverride` if the expression has no `=` or an empty key
/// segment.
pub fn apply_set_override(document: &mut Value, expression: &str) -> Result<()> {
    let invalid = |reason: &str| {
        GuardError::Config(ConfigError::InvalidOverride {
            expression: expression.to_string(),
            reason: reason.to_string(),
        })
    };

    let (path, raw) = split_assignment(expression).ok_or_else(|| invalid("expected path=value"))?;
    let segments = split_path(path);
    if segments.iter().any(String::is_empty) {
        return Err(invalid("key path contains an empty segment"));
    }

    debug!("Applying override: {}", segments.join("."));
    set_path(document, &segments, parse_scalar(raw));
    Ok(())
}

/// Splits at the first `=`; the value may contain more.
fn split_assignment(expression: &str) -> Option<(&str, &str)> {
    let index = expression.find('=')?;
    Some((&expression[..index], &expression[index + 1..]))
}

/// Splits a dotted path, honouring `\.` escapes.
fn split_path(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'.') => {
                current.push('.');
                chars.next();
            }
            '.' => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    segments.push(current);
    segments
}

/// Infers the YAML type of an override value.
fn parse_scalar(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => raw
            .parse::<i64>()
            .map_or_else(|_| Value::String(raw.to_string()), |n| Value::Number(n.into())),
    }
}

/// Writes `value` at `segments`, creating or replacing intermediate mappings.
fn set_path(document: &mut Value, segments: &[String], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut node = document;
    for segment in parents {
        if !node.is_mapping() {
            *node = Value::Mapping(Mapping::new());
        }
        let Value::Mapping(map) = node else {
            return;
        };
        let key = Value::String(segment.clone());
        if !map.contains_key(&key) {
            map.insert(key.clone(), Value::Mapping(Mapping::new()));
        }
        let Some(child) = map.get_mut(&key) else {
            return;
        };
        node = child;
    }

    if !node.is_mapping() {
        *node = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(map) = node {
        map.insert(Value::String(last.clone()), value);
    }
}

/// Default values file names to search for.
pub const DEFAULT_VALUES_FILES: &[&str] = &["values.yaml", "values.yml"];

/// Finds the values file in the given directory or its parents.
///
/// # Errors
///
/// Returns an error if no values file is found.
pub fn find_values_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_VALUES_FILES {
            let values_path = current.join(filename);
            if values_path.exists() {
                info!("Found values file: {}", values_path.display());
                return Ok(values_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(not_found(&start.join(DEFAULT_VALUES_FILES[0])))
}
