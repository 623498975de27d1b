use crate::core::installer::InstallStep;
use crate::error::{InstallerError, Result};
use crate::utils::fs;
use flate2::read::GzDecoder;
use std::cell::RefCell;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tar::Archive;
use tracing::{debug, error};
use zip::ZipArchive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    Zip,
    Plain,
}

impl ArchiveKind {
    pub fn detect(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_lowercase();

        if file_name.ends_with(".tar.gz") || file_name.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else if file_name.ends_with(".zip") {
            Some(ArchiveKind::Zip)
        } else {
            Some(ArchiveKind::Plain)
        }
    }
}

/// Install step that unpacks the downloaded file into a target directory.
///
/// `.tar.gz`/`.tgz` and `.zip` files are extracted; anything else is copied
/// into the target as-is and marked executable. The last failure is kept
/// in [`StepFailure`] so callers building the step can inspect it.
pub struct ExtractArchive {
    destination: PathBuf,
    failure: StepFailure,
}

/// Shared slot holding the error of the most recent failed run.
pub type StepFailure = Rc<RefCell<Option<InstallerError>>>;

impl ExtractArchive {
    pub fn new<P: Into<PathBuf>>(destination: P) -> Self {
        Self {
            destination: destination.into(),
            failure: StepFailure::default(),
        }
    }

    pub fn failure(&self) -> StepFailure {
        Rc::clone(&self.failure)
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn extract(&self, archive_path: &Path) -> Result<()> {
        println!(
            "Extracting {} to {}",
            archive_path.display(),
            self.destination.display()
        );

        fs::ensure_dir_exists(&self.destination)?;

        let kind = ArchiveKind::detect(archive_path).ok_or_else(|| {
            InstallerError::UnsupportedArchive {
                name: archive_path.display().to_string(),
            }
        })?;
        debug!(?kind, path = %archive_path.display(), "extracting");

        match kind {
            ArchiveKind::TarGz => self.extract_tar_gz(archive_path)?,
            ArchiveKind::Zip => self.extract_zip(archive_path)?,
            ArchiveKind::Plain => self.copy_plain(archive_path)?,
        }

        println!("Extraction completed");
        Ok(())
    }

    fn extract_tar_gz(&self, archive_path: &Path) -> Result<()> {
        let file = File::open(archive_path)?;
        let decoder = GzDecoder::new(file);
        let mut archive = Archive::new(decoder);
        archive
            .unpack(&self.destination)
            .map_err(|source| InstallerError::Extraction {
                path: archive_path.to_path_buf(),
                source,
            })
    }

    fn extract_zip(&self, archive_path: &Path) -> Result<()> {
        let zip_error = |source| InstallerError::Zip {
            path: archive_path.to_path_buf(),
            source,
        };

        let file = File::open(archive_path)?;
        let mut archive = ZipArchive::new(file).map_err(zip_error)?;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(zip_error)?;
            let outpath = match entry.enclosed_name() {
                Some(path) => self.destination.join(path),
                None => continue,
            };

            if entry.is_dir() {
                fs::ensure_dir_exists(&outpath)?;
                continue;
            }

            if let Some(parent) = outpath.parent() {
                fs::ensure_dir_exists(parent)?;
            }
            let mut outfile = File::create(&outpath)?;
            std::io::copy(&mut entry, &mut outfile)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
                }
            }
        }
        Ok(())
    }

    fn copy_plain(&self, path: &Path) -> Result<()> {
        let file_name = path
            .file_name()
            .ok_or_else(|| InstallerError::UnsupportedArchive {
                name: path.display().to_string(),
            })?;
        let target = self.destination.join(file_name);
        std::fs::copy(path, &target)?;
        fs::make_executable(&target)
    }
}

impl InstallStep for ExtractArchive {
    fn install(&self, path: &Path) {
        match self.extract(path) {
            Ok(()) => {
                self.failure.borrow_mut().take();
            }
            Err(e) => {
                error!(path = %path.display(), "install step failed: {e}");
                *self.failure.borrow_mut() = Some(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_detect_kind() {
        assert_eq!(
            ArchiveKind::detect(Path::new("code-1.49.tar.gz")),
            Some(ArchiveKind::TarGz)
        );
        assert_eq!(
            ArchiveKind::detect(Path::new("tool.TGZ")),
            Some(ArchiveKind::TarGz)
        );
        assert_eq!(
            ArchiveKind::detect(Path::new("tool-1.0.zip")),
            Some(ArchiveKind::Zip)
        );
        assert_eq!(
            ArchiveKind::detect(Path::new("tool-1.0")),
            Some(ArchiveKind::Plain)
        );
        assert_eq!(ArchiveKind::detect(Path::new("/")), None);
    }

    #[test]
    fn test_extract_tar_gz() {
        let temp = tempfile::tempdir().unwrap();
        let archive_path = temp.path().join("tool-1.0.tar.gz");

        {
            let file = File::create(&archive_path).unwrap();
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            let mut builder = tar::Builder::new(encoder);
            let data = b"#!/bin/sh\necho tool\n";
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder
                .append_data(&mut header, "bin/tool", &data[..])
                .unwrap();
            builder.into_inner().unwrap().finish().unwrap();
        }

        let target = temp.path().join("installed");
        ExtractArchive::new(&target).extract(&archive_path).unwrap();

        let extracted = std::fs::read_to_string(target.join("bin/tool")).unwrap();
        assert_eq!(extracted, "#!/bin/sh\necho tool\n");
    }

    #[test]
    fn test_extract_zip() {
        let temp = tempfile::tempdir().unwrap();
        let archive_path = temp.path().join("tool-1.0.zip");

        {
            let file = File::create(&archive_path).unwrap();
            let mut writer = zip::ZipWriter::new(file);
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file("docs/readme.txt", options).unwrap();
            writer.write_all(b"hello").unwrap();
            writer.finish().unwrap();
        }

        let target = temp.path().join("installed");
        ExtractArchive::new(&target).extract(&archive_path).unwrap();

        let extracted = std::fs::read_to_string(target.join("docs/readme.txt")).unwrap();
        assert_eq!(extracted, "hello");
    }

    #[test]
    fn test_copy_plain_file() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("tool-1.0");
        std::fs::write(&source, b"binary").unwrap();

        let target = temp.path().join("bin");
        ExtractArchive::new(&target).install(&source);

        assert_eq!(std::fs::read(target.join("tool-1.0")).unwrap(), b"binary");
    }

    #[test]
    fn test_corrupt_zip_is_zip_error() {
        let temp = tempfile::tempdir().unwrap();
        let archive_path = temp.path().join("broken.zip");
        std::fs::write(&archive_path, b"not a zip").unwrap();

        let result = ExtractArchive::new(temp.path().join("out")).extract(&archive_path);
        assert!(matches!(result, Err(InstallerError::Zip { .. })));
    }

    #[test]
    fn test_corrupt_tar_keeps_cause() {
        let temp = tempfile::tempdir().unwrap();
        let archive_path = temp.path().join("broken.tar.gz");
        std::fs::write(&archive_path, b"not gzip at all").unwrap();

        let result = ExtractArchive::new(temp.path().join("out")).extract(&archive_path);
        match result {
            Err(InstallerError::Extraction { path, .. }) => assert_eq!(path, archive_path),
            other => panic!("expected extraction error, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_install_is_recorded() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("tool-1.0");
        std::fs::write(&source, b"binary").unwrap();

        // A regular file where the target directory should be
        let target = temp.path().join("occupied");
        std::fs::write(&target, b"").unwrap();

        let step = ExtractArchive::new(&target);
        let failure = step.failure();
        step.install(&source);
        assert!(failure.borrow().is_some());

        std::fs::remove_file(&target).unwrap();
        step.install(&source);
        assert!(failure.borrow().is_none());
        assert_eq!(std::fs::read(target.join("tool-1.0")).unwrap(), b"binary");
    }
}
