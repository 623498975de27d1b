use crate::core::fetch::{Fetch, HttpFetcher};
use crate::core::progress::{ConsoleReporter, Outcome, Reporter, Step};
use crate::error::{InstallerError, Result};
use crate::utils::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Placeholder replaced by the version in URL and file name templates.
pub const VERSION_PLACEHOLDER: &str = "%s";

/// Called with the path of a downloaded version file.
///
/// The step cannot report failure back to the installer; implementations
/// handle their own errors.
pub trait InstallStep {
    fn install(&self, path: &Path);
}

impl<F> InstallStep for F
where
    F: Fn(&Path),
{
    fn install(&self, path: &Path) {
        self(path)
    }
}

/// Parameters used to create an [`Installer`].
pub struct InstallerOptions {
    /// URL of the file to download; `%s` is replaced by the version.
    pub url_template: String,

    /// Absolute path, or path relative to the base directory, where files are cached.
    pub cache_dir: PathBuf,

    /// Name of downloaded files; `%s` is replaced by the version.
    pub file_template: String,

    pub install: Box<dyn InstallStep>,

    /// Always download, even when a cached file exists.
    pub no_cache: bool,
}

impl InstallerOptions {
    pub fn new<U: Into<String>, F: Into<String>>(url_template: U, file_template: F) -> Self {
        Self {
            url_template: url_template.into(),
            cache_dir: PathBuf::new(),
            file_template: file_template.into(),
            install: Box::new(|_: &Path| {}),
            no_cache: false,
        }
    }

    pub fn cache_dir<P: Into<PathBuf>>(mut self, cache_dir: P) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    pub fn install<S: InstallStep + 'static>(mut self, step: S) -> Self {
        self.install = Box::new(step);
        self
    }

    /// Absolute download directory: `cache_dir` as-is when absolute, otherwise
    /// joined onto `base_dir`.
    pub fn resolve_cache_dir(&self, base_dir: &Path) -> PathBuf {
        if self.cache_dir.is_absolute() {
            self.cache_dir.clone()
        } else {
            base_dir.join(&self.cache_dir)
        }
    }

    /// Resolves the cache directory against `base_dir` and builds the installer.
    pub fn create<P: AsRef<Path>>(self, base_dir: P) -> Installer {
        let download_dir = self.resolve_cache_dir(base_dir.as_ref());

        Installer {
            options: self,
            download_dir,
            fetcher: Box::new(HttpFetcher::new()),
            reporter: Box::new(ConsoleReporter),
        }
    }
}

pub fn create<P: AsRef<Path>>(options: InstallerOptions, base_dir: P) -> Installer {
    options.create(base_dir)
}

pub fn render_template(template: &str, version: &str) -> String {
    template.replacen(VERSION_PLACEHOLDER, version, 1)
}

/// Downloads versions of a tool into a local cache and installs them.
pub struct Installer {
    options: InstallerOptions,
    download_dir: PathBuf,
    fetcher: Box<dyn Fetch>,
    reporter: Box<dyn Reporter>,
}

impl Installer {
    pub fn with_fetcher<F: Fetch + 'static>(mut self, fetcher: F) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    pub fn with_reporter<R: Reporter + 'static>(mut self, reporter: R) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn url(&self, version: &str) -> String {
        render_template(&self.options.url_template, version)
    }

    pub fn download_path(&self, version: &str) -> PathBuf {
        self.download_dir
            .join(render_template(&self.options.file_template, version))
    }

    /// Downloads `version`, reusing a cached file unless caching is disabled.
    ///
    /// Returns the absolute path of the local file. A failed copy may leave a
    /// truncated file behind.
    pub fn download(&self, version: &str) -> Result<PathBuf> {
        let download_path = self.download_path(version);

        if !self.options.no_cache {
            self.reporter.start(Step::CacheCheck);
            if fs::is_cached_file(&download_path) {
                self.reporter.finish(Step::CacheCheck, Outcome::Yes);
                debug!(path = %download_path.display(), "using cached download");
                return Ok(download_path);
            }
            self.reporter.finish(Step::CacheCheck, Outcome::No);
        }

        self.ensure_download_dir()?;

        let url = self.url(version);
        debug!(%url, "fetching");
        self.reporter.start(Step::Fetch);
        let mut body = self.report(Step::Fetch, self.fetcher.fetch(&url))?;

        self.reporter.start(Step::CreateFile);
        let file = std::fs::File::create(&download_path).map_err(|source| {
            InstallerError::CreateFile {
                path: download_path.clone(),
                source,
            }
        });
        let mut file = self.report(Step::CreateFile, file)?;

        self.reporter.start(Step::Copy);
        let copied = std::io::copy(&mut body, &mut file).map_err(|source| InstallerError::Copy {
            path: download_path.clone(),
            source,
        });
        let bytes = self.report(Step::Copy, copied)?;

        debug!(path = %download_path.display(), bytes, "download complete");
        Ok(download_path)
    }

    /// Downloads `version` and hands the file to the install step.
    pub fn install(&self, version: &str) -> Result<()> {
        let path = self.download(version)?;

        debug!(path = %path.display(), "running install step");
        self.options.install.install(&path);

        Ok(())
    }

    fn ensure_download_dir(&self) -> Result<()> {
        let dir = &self.download_dir;

        self.reporter.start(Step::DirectoryCheck);
        match std::fs::metadata(dir) {
            Ok(_) => {
                self.reporter.finish(Step::DirectoryCheck, Outcome::Yes);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.reporter.finish(Step::DirectoryCheck, Outcome::No);
                self.reporter.start(Step::CreateDirectory);
                self.report(Step::CreateDirectory, fs::create_dir_all_permissive(dir))
            }
            Err(source) => {
                self.reporter.finish(Step::DirectoryCheck, Outcome::Error);
                let error = InstallerError::Stat {
                    path: dir.clone(),
                    source,
                };
                warn!("{error}");
                Err(error)
            }
        }
    }

    fn report<T>(&self, step: Step, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.reporter.finish(step, Outcome::Done);
                Ok(value)
            }
            Err(e) => {
                self.reporter.finish(step, Outcome::Error);
                warn!("{e}");
                Err(e)
            }
        }
    }
}
