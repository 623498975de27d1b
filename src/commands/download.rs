use crate::commands::Settings;
use crate::error::Result;
use std::path::PathBuf;

pub fn download_version(version: &str, settings: &Settings) -> Result<PathBuf> {
    let (profile, base_dir) = settings.resolve()?;
    let installer = settings.installer(settings.options(&profile)?, &base_dir);

    if !settings.quiet {
        println!("Downloading version {version}");
    }

    let path = installer.download(version)?;
    println!("{}", path.display());

    Ok(path)
}
