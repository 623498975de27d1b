use crate::commands::Settings;
use crate::core::extract::{ExtractArchive, StepFailure};
use crate::core::installer::{render_template, Installer};
use crate::error::{InstallerError, Result};
use std::path::{Path, PathBuf};

pub fn install_version(version: &str, settings: &Settings) -> Result<()> {
    let (profile, base_dir) = settings.resolve()?;
    let options = settings.options(&profile)?;

    let download_dir = options.resolve_cache_dir(&base_dir);
    let destination = extract_destination(
        profile.extract_to.as_deref(),
        &base_dir,
        &download_dir,
        version,
    );
    let download_path = download_dir.join(render_template(&options.file_template, version));
    check_destination(&destination, &download_path)?;

    let step = ExtractArchive::new(&destination);
    let failure = step.failure();
    let installer = settings.installer(options.install(step), &base_dir);

    if !settings.quiet {
        println!("Installing version {version}");
    }

    run_install(&installer, version, &failure)?;

    if !settings.quiet {
        println!("Installed {version} to {}", destination.display());
    }

    Ok(())
}

/// Runs the installer and surfaces any failure the extract step recorded.
fn run_install(installer: &Installer, version: &str, failure: &StepFailure) -> Result<()> {
    installer.install(version)?;

    match failure.borrow_mut().take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Target of the extract step: the configured directory (relative to the
/// base directory), or `installed/<version>` under the download directory.
pub fn extract_destination(
    extract_to: Option<&Path>,
    base_dir: &Path,
    download_dir: &Path,
    version: &str,
) -> PathBuf {
    match extract_to {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => base_dir.join(dir),
        None => download_dir.join("installed").join(version),
    }
}

/// The extract target must not be, or sit inside, the downloaded file.
fn check_destination(destination: &Path, download_path: &Path) -> Result<()> {
    if destination.starts_with(download_path) {
        return Err(InstallerError::config_error(format!(
            "Install directory {} overlaps the download {}",
            destination.display(),
            download_path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fetch::Fetch;
    use crate::core::installer::InstallerOptions;
    use crate::core::progress::SilentReporter;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Read};

    struct StaticFetcher(&'static [u8]);

    impl Fetch for StaticFetcher {
        fn fetch(&self, _url: &str) -> Result<Box<dyn Read>> {
            Ok(Box::new(Cursor::new(self.0)))
        }
    }

    fn installer_with_step(base: &Path, file_template: &str, step: ExtractArchive) -> Installer {
        InstallerOptions::new("https://host/%s", file_template)
            .install(step)
            .create(base)
            .with_fetcher(StaticFetcher(b"binary"))
            .with_reporter(SilentReporter)
    }

    #[test]
    fn test_extract_destination() {
        let base = Path::new("/base");
        let downloads = Path::new("/cache/tool");

        assert_eq!(
            extract_destination(None, base, downloads, "1.0"),
            PathBuf::from("/cache/tool/installed/1.0")
        );
        assert_eq!(
            extract_destination(Some(Path::new("tools/x")), base, downloads, "1.0"),
            PathBuf::from("/base/tools/x")
        );
        assert_eq!(
            extract_destination(Some(Path::new("/opt/x")), base, downloads, "1.0"),
            PathBuf::from("/opt/x")
        );
    }

    #[test]
    fn test_bare_version_file_template_installs() {
        let temp = tempfile::tempdir().unwrap();
        let destination = extract_destination(None, temp.path(), temp.path(), "1.0");
        check_destination(&destination, &temp.path().join("1.0")).unwrap();

        let step = ExtractArchive::new(&destination);
        let failure = step.failure();
        let installer = installer_with_step(temp.path(), "%s", step);

        run_install(&installer, "1.0", &failure).unwrap();
        assert!(temp.path().join("1.0").is_file());
        assert_eq!(std::fs::read(destination.join("1.0")).unwrap(), b"binary");
    }

    #[test]
    fn test_failed_extract_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let destination = temp.path().join("occupied");
        std::fs::write(&destination, b"").unwrap();

        let step = ExtractArchive::new(&destination);
        let failure = step.failure();
        let installer = installer_with_step(temp.path(), "tool-%s", step);

        let result = run_install(&installer, "1.0", &failure);
        assert!(matches!(result, Err(InstallerError::Io(_))));
    }

    #[test]
    fn test_destination_overlapping_download_rejected() {
        let download = Path::new("/cache/tool/1.0");

        let result = check_destination(download, download);
        assert!(matches!(result, Err(InstallerError::Config { .. })));

        let result = check_destination(&download.join("sub"), download);
        assert!(matches!(result, Err(InstallerError::Config { .. })));

        check_destination(Path::new("/cache/tool/installed/1.0"), download).unwrap();
    }
}
