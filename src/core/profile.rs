use crate::core::installer::InstallerOptions;
use crate::error::{InstallerError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A tool described in a TOML file.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub url: Option<String>,
    pub file: Option<String>,
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub no_cache: bool,
    pub extract_to: Option<PathBuf>,
}

impl Profile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            InstallerError::config_error(format!("Cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Applies values given on the command line on top of this profile.
    pub fn merge(self, overrides: Profile) -> Profile {
        Profile {
            url: overrides.url.or(self.url),
            file: overrides.file.or(self.file),
            cache_dir: overrides.cache_dir.or(self.cache_dir),
            no_cache: overrides.no_cache || self.no_cache,
            extract_to: overrides.extract_to.or(self.extract_to),
        }
    }

    /// Builds installer options, falling back to `default_cache_dir` when no cache dir is set.
    pub fn to_options(&self, default_cache_dir: &Path) -> Result<InstallerOptions> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| InstallerError::config_error("No download URL template given"))?;
        let file = self
            .file
            .as_deref()
            .ok_or_else(|| InstallerError::config_error("No file name template given"))?;

        let cache_dir = self
            .cache_dir
            .clone()
            .unwrap_or_else(|| default_cache_dir.to_path_buf());

        Ok(InstallerOptions::new(url, file)
            .cache_dir(cache_dir)
            .no_cache(self.no_cache))
    }
}

pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("vinstall"))
        .unwrap_or_else(|| PathBuf::from(".vinstall"))
}
