//! Manifest Resolver
//!
//! Turns manifest text into a validated [`Manifest`]. Pure: it reads no
//! files and touches no network, so every check here runs before the first
//! transfer.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use toml::{Table, Value};

use crate::domain::entities::{Manifest, SyncRule};
use crate::domain::value_objects::{Direction, EntryKind, PathFilters};
use crate::error::ValidationError;

const RULE_KEYS: &[&str] = &[
    "local",
    "remote",
    "direction",
    "kind",
    "optional",
    "include",
    "exclude",
];

/// Resolves manifest text into rules with absolute local paths.
#[derive(Debug, Clone)]
pub struct ManifestResolver {
    /// Directory relative local paths are resolved against
    base_dir: PathBuf,
    /// Local home directory for `~/` local paths
    home_dir: Option<PathBuf>,
}

impl ManifestResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            home_dir: None,
        }
    }

    pub fn with_home_dir(mut self, home: Option<PathBuf>) -> Self {
        self.home_dir = home;
        self
    }

    /// Parse and validate manifest text.
    pub fn resolve(&self, source: &str) -> Result<Manifest, ValidationError> {
        let doc: Table =
            toml::from_str(source).map_err(|e| ValidationError::Syntax(e.message().to_string()))?;

        if let Some(key) = doc.keys().find(|k| k.as_str() != "rule") {
            return Err(ValidationError::Syntax(format!(
                "unknown top-level key '{}' (rules are declared as [[rule]] tables)",
                key
            )));
        }

        let entries = match doc.get("rule") {
            None => return Ok(Manifest::default()),
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(ValidationError::Syntax(
                    "'rule' must be an array of tables ([[rule]])".to_string(),
                ))
            }
        };

        let mut rules = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            rules.push(self.resolve_rule(index, entry)?);
        }

        check_targets(&rules)?;
        Ok(Manifest::new(rules))
    }

    fn resolve_rule(&self, index: usize, entry: &Value) -> Result<SyncRule, ValidationError> {
        let malformed = |message: String| ValidationError::MalformedRule { index, message };

        let table = entry
            .as_table()
            .ok_or_else(|| malformed("expected a table".to_string()))?;

        if let Some(key) = table.keys().find(|k| !RULE_KEYS.contains(&k.as_str())) {
            return Err(malformed(format!("unknown field '{}'", key)));
        }

        let local = required_str(table, index, "local")?;
        check_path_text(index, "local", local)?;
        let remote = required_str(table, index, "remote")?;
        check_path_text(index, "remote", remote)?;
        check_remote(index, remote)?;

        let direction = match optional_str(table, index, "direction")? {
            None => Direction::default(),
            Some(value) => Direction::parse(value).ok_or_else(|| {
                malformed(format!(
                    "direction must be 'push' or 'pull', got '{}'",
                    value
                ))
            })?,
        };

        let kind = match optional_str(table, index, "kind")? {
            None => EntryKind::default(),
            Some(value) => EntryKind::parse(value).ok_or_else(|| {
                malformed(format!(
                    "kind must be 'file' or 'directory', got '{}'",
                    value
                ))
            })?,
        };

        let optional = match table.get("optional") {
            None => false,
            Some(Value::Boolean(b)) => *b,
            Some(other) => {
                return Err(malformed(format!(
                    "optional must be true or false, got {}",
                    other
                )))
            }
        };

        let filters = PathFilters::new(
            string_list(table, index, "include")?,
            string_list(table, index, "exclude")?,
        );
        if !filters.is_empty() && !kind.is_directory() {
            return Err(malformed(
                "include/exclude patterns require kind = \"directory\"".to_string(),
            ));
        }
        for pattern in filters.include.iter().chain(filters.exclude.iter()) {
            PathFilters::check_pattern(pattern).map_err(|e| malformed(e.to_string()))?;
        }

        let local_path = self.resolve_local(index, local)?;

        Ok(SyncRule::new(local, local_path, remote)
            .with_index(index)
            .with_direction(direction)
            .with_kind(kind)
            .with_optional(optional)
            .with_filters(filters))
    }

    fn resolve_local(&self, index: usize, local: &str) -> Result<PathBuf, ValidationError> {
        let joined = if local == "~" || local.starts_with("~/") {
            let home = self
                .home_dir
                .as_ref()
                .ok_or_else(|| ValidationError::MalformedRule {
                    index,
                    message: format!("cannot expand '{}': no home directory", local),
                })?;
            home.join(local.trim_start_matches('~').trim_start_matches('/'))
        } else {
            let path = Path::new(local);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.base_dir.join(path)
            }
        };
        Ok(joined
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect())
    }
}

fn required_str<'a>(
    table: &'a Table,
    index: usize,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    optional_str(table, index, field)?
        .ok_or(ValidationError::MissingRequiredField { index, field })
}

fn optional_str<'a>(
    table: &'a Table,
    index: usize,
    field: &str,
) -> Result<Option<&'a str>, ValidationError> {
    match table.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(ValidationError::MalformedRule {
            index,
            message: format!("{} must be a string, got {}", field, other.type_str()),
        }),
    }
}

fn string_list(table: &Table, index: usize, field: &str) -> Result<Vec<String>, ValidationError> {
    let malformed = || ValidationError::MalformedRule {
        index,
        message: format!("{} must be an array of strings", field),
    };
    match table.get(field) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(malformed))
            .collect(),
        Some(_) => Err(malformed()),
    }
}

fn check_path_text(index: usize, field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MalformedRule {
            index,
            message: format!("{} path is empty", field),
        });
    }
    if value.chars().any(char::is_control) {
        return Err(ValidationError::MalformedRule {
            index,
            message: format!("{} path contains control characters", field),
        });
    }
    Ok(())
}

fn check_remote(index: usize, remote: &str) -> Result<(), ValidationError> {
    if !(remote.starts_with('/') || remote == "~" || remote.starts_with("~/")) {
        return Err(ValidationError::MalformedRule {
            index,
            message: format!("remote path '{}' must be absolute or start with '~/'", remote),
        });
    }
    if remote.split('/').any(|segment| segment == "..") {
        return Err(ValidationError::MalformedRule {
            index,
            message: format!("remote path '{}' must not contain '..'", remote),
        });
    }
    Ok(())
}

/// Normalized key for comparing remote targets (`/a/b/` == `/a/b`)
fn target_key(remote: &str) -> &str {
    let trimmed = remote.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

fn check_targets(rules: &[SyncRule]) -> Result<(), ValidationError> {
    let mut seen: HashMap<&str, (usize, Direction)> = HashMap::new();

    for rule in rules {
        let key = target_key(&rule.remote_path);
        match seen.get(key) {
            Some(&(first, direction)) if direction != rule.direction => {
                return Err(ValidationError::DuplicateTarget {
                    remote: rule.remote_path.clone(),
                    first,
                    second: rule.index,
                    reason: "pushed and pulled in the same manifest",
                });
            }
            Some(&(first, Direction::Push)) => {
                return Err(ValidationError::DuplicateTarget {
                    remote: rule.remote_path.clone(),
                    first,
                    second: rule.index,
                    reason: "pushed more than once",
                });
            }
            Some(_) => {}
            None => {
                seen.insert(key, (rule.index, rule.direction));
            }
        }
    }

    Ok(())
}
