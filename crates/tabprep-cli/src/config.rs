//! TOML job files for `tabprep run`.
//!
//! ```toml
//! inputs = ["visits.csv", "labs.csv"]
//! output = "out/merged.csv"
//! report = "out/report.json"
//!
//! [merge]
//! mode = "horizontal"
//! join = "left"
//! keys = [{ left = "subject", right = "subject_id" }]
//! ```
//!
//! A job holds exactly one of `[merge]` or `[asof]`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tabprep_model::{AsOfSpec, MergeSpec};
use thiserror::Error;

/// Errors raised while loading a job file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read job file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse job file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("job file {path} must define exactly one of [merge] or [asof]")]
    Strategy { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asof: Option<AsOfSpec>,
}

/// The merge a job asks for.
#[derive(Debug, Clone, Copy)]
pub enum Job<'a> {
    Merge(&'a MergeSpec),
    AsOf(&'a AsOfSpec),
}

impl JobConfig {
    /// Loads a job file and resolves its relative paths against the file's
    /// directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content, path)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        tracing::info!(path = %path.display(), inputs = config.inputs.len(), "loaded job file");
        Ok(config)
    }

    /// Parses job TOML; `path` is used in errors only.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.job(path)?;
        Ok(config)
    }

    pub fn job(&self, path: &Path) -> Result<Job<'_>, ConfigError> {
        match (&self.merge, &self.asof) {
            (Some(merge), None) => Ok(Job::Merge(merge)),
            (None, Some(asof)) => Ok(Job::AsOf(asof)),
            _ => Err(ConfigError::Strategy {
                path: path.to_path_buf(),
            }),
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        self.inputs.iter_mut().for_each(resolve);
        resolve(&mut self.output);
        if let Some(report) = self.report.as_mut() {
            resolve(report);
        }
    }
}
