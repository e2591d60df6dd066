use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Whether a registered project is a live database connection or a
/// file-backed snapshot loaded from/written to a directory tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Connection,
    /// Older configs spell this `project`; treated as equivalent.
    #[serde(alias = "project")]
    File,
}

/// One entry of the project registry (`config.yml`).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProjectConfig {
    pub project_name: String,
    pub engine: String,
    #[serde(rename = "type")]
    pub kind: ProjectKind,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl ProjectConfig {
    #[must_use]
    pub fn new(project_name: impl Into<String>, engine: impl Into<String>, kind: ProjectKind) -> Self {
        Self {
            project_name: project_name.into(),
            engine: engine.into(),
            kind,
            params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Checks every required key in `required` is present and non-empty.
    /// Used for connection projects (all of host/port/database/user/password
    /// required) and for file projects (only `source` is required; `filetype`
    /// defaults to `yml`).
    pub fn validate_params(&self, required: &[&str]) -> Result<()> {
        for key in required {
            match self.params.get(*key) {
                Some(value) if !value.is_empty() => {}
                _ => {
                    return Err(Error::MissingParam {
                        name: (*key).to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn filetype(&self) -> &str {
        self.params.get("filetype").map(String::as_str).unwrap_or("yml")
    }
}

/// The `projects:` document persisted at `config.yml`.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ProjectsConfig {
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectConfig>,
}

impl ProjectsConfig {
    /// Loads the registry from `path`, creating an empty one on disk if it
    /// doesn't exist yet (SPEC_FULL.md §6).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let empty = Self::default();
            empty.save(path)?;
            return Ok(empty);
        }
        let text = fs::read_to_string(path).map_err(|source| Error::IoError {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(Error::ConfigNotFound {
                    path: path.display().to_string(),
                });
            }
        }
        let text = serde_yaml::to_string(self).map_err(|source| Error::SerializationError {
            path: path.display().to_string(),
            source,
        })?;
        fs::write(path, text).map_err(|source| Error::IoError {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn get(&self, name: &str) -> Result<&ProjectConfig> {
        self.projects.get(name).ok_or_else(|| Error::ProjectMissing { name: name.to_string() })
    }

    pub fn insert(&mut self, config: ProjectConfig) -> Result<()> {
        if self.projects.contains_key(&config.project_name) {
            return Err(Error::ProjectExists {
                name: config.project_name,
            });
        }
        self.projects.insert(config.project_name.clone(), config);
        Ok(())
    }
}

/// A typed connection-parameter record supporting string get/set, used by a
/// dialect's `new_params()` so CLI `k=v` pairs can be validated generically
/// before a `ProjectConfig` is built.
pub trait ConnectionParams: Send + Sync {
    fn get(&self, key: &str) -> Option<&str>;
    fn set(&mut self, key: &str, value: String);
    fn required_keys(&self) -> &'static [&'static str];
    fn validate(&self) -> Result<()>;
    fn into_map(self: Box<Self>) -> BTreeMap<String, String>;
}

/// The stock `ConnectionParams` implementation every dialect reaches for: a
/// plain name→value map plus a fixed required-key list.
pub struct DefaultConnectionParams {
    required: &'static [&'static str],
    values: BTreeMap<String, String>,
}

impl DefaultConnectionParams {
    #[must_use]
    pub fn new(required: &'static [&'static str]) -> Self {
        Self {
            required,
            values: BTreeMap::new(),
        }
    }
}

impl ConnectionParams for DefaultConnectionParams {
    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn required_keys(&self) -> &'static [&'static str] {
        self.required
    }

    fn validate(&self) -> Result<()> {
        for key in self.required {
            match self.values.get(*key) {
                Some(value) if !value.is_empty() => {}
                _ => {
                    return Err(Error::MissingParam {
                        name: (*key).to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn into_map(self: Box<Self>) -> BTreeMap<String, String> {
        self.values
    }
}
