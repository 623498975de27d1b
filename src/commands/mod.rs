pub mod download;
pub mod install;

use crate::core::installer::{Installer, InstallerOptions};
use crate::core::profile::{default_cache_dir, Profile};
use crate::core::progress::SilentReporter;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Where a command's settings come from.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Optional TOML profile; its directory becomes the base directory.
    pub config: Option<PathBuf>,
    /// Values given directly on the command line.
    pub overrides: Profile,
    pub quiet: bool,
}

impl Settings {
    pub fn resolve(&self) -> Result<(Profile, PathBuf)> {
        let (profile, base_dir) = match &self.config {
            Some(path) => {
                let profile = Profile::load(path)?;
                (profile, config_base_dir(path)?)
            }
            None => (Profile::default(), std::env::current_dir()?),
        };

        Ok((profile.merge(self.overrides.clone()), base_dir))
    }

    pub fn options(&self, profile: &Profile) -> Result<InstallerOptions> {
        profile.to_options(&default_cache_dir())
    }

    pub fn installer(&self, options: InstallerOptions, base_dir: &Path) -> Installer {
        let installer = options.create(base_dir);

        if self.quiet {
            installer.with_reporter(SilentReporter)
        } else {
            installer
        }
    }
}

fn config_base_dir(path: &Path) -> Result<PathBuf> {
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    if dir.is_absolute() {
        Ok(dir.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(dir))
    }
}
