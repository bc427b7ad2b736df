//! Oracle configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Names the oracle treats as promise producers without a declaration to
/// look at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OracleOptions {
    /// Undeclared functions whose calls return promises.
    pub promise_globals: Vec<String>,
    /// Method names whose calls return promises on any receiver
    /// (`res.json()`).
    pub promise_members: Vec<String>,
    /// Type names that denote a promise in annotations.
    pub promise_type_names: Vec<String>,
}

impl Default for OracleOptions {
    fn default() -> Self {
        OracleOptions {
            promise_globals: vec!["fetch".to_string()],
            promise_members: ["json", "text", "blob", "arrayBuffer", "formData"]
                .into_iter()
                .map(String::from)
                .collect(),
            promise_type_names: vec!["Promise".to_string(), "PromiseLike".to_string()],
        }
    }
}

impl OracleOptions {
    /// Parse options from JSON5 text. Missing fields keep their defaults.
    pub fn from_json5_str(text: &str) -> Result<OracleOptions, ConfigError> {
        json5::from_str(text).map_err(|err| ConfigError::Parse {
            path: None,
            message: err.to_string(),
        })
    }

    /// Read and parse a JSON5 options file.
    pub fn load(path: &Path) -> Result<OracleOptions, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        json5::from_str(&text).map_err(|err| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            message: err.to_string(),
        })
    }

    #[inline]
    pub fn is_promise_global(&self, name: &str) -> bool {
        self.promise_globals.iter().any(|g| g == name)
    }

    #[inline]
    pub fn is_promise_member(&self, name: &str) -> bool {
        self.promise_members.iter().any(|m| m == name)
    }

    #[inline]
    pub fn is_promise_type_name(&self, name: &str) -> bool {
        self.promise_type_names.iter().any(|t| t == name)
    }
}

/// Error loading oracle options.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: Option<PathBuf>,
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
            ConfigError::Parse {
                path: Some(path),
                message,
            } => write!(f, "invalid options in {}: {}", path.display(), message),
            ConfigError::Parse {
                path: None,
                message,
            } => write!(f, "invalid options: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "tests/options_tests.rs"]
mod tests;
