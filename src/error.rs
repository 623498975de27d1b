use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, InstallerError>;

#[derive(Error, Debug)]
pub enum InstallerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to inspect {path}: {source}")]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create download directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Permission denied: {path}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Download failed: {url}: {source}")]
    Fetch {
        url: String,
        source: reqwest::Error,
    },

    #[error("Download failed: {url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to create destination file {path}: {source}")]
    CreateFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write downloaded file {path}: {source}")]
    Copy {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported archive format: {name}")]
    UnsupportedArchive { name: String },

    #[error("Extraction failed: {path}: {source}")]
    Extraction {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Extraction failed: {path}: {source}")]
    Zip {
        path: PathBuf,
        source: zip::result::ZipError,
    },
}

impl InstallerError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        InstallerError::Config {
            message: message.into(),
        }
    }

    /// Maps a directory creation failure, singling out permission problems.
    pub fn create_dir(path: &std::path::Path, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => InstallerError::PermissionDenied {
                path: path.to_path_buf(),
                source,
            },
            _ => InstallerError::CreateDir {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::path::Path;

    #[test]
    fn test_create_dir_keeps_permission_cause() {
        let error = InstallerError::create_dir(
            Path::new("/locked/cache"),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );

        assert!(matches!(error, InstallerError::PermissionDenied { .. }));
        let source = error.source().unwrap();
        let io = source.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_create_dir_other_failure() {
        let error = InstallerError::create_dir(
            Path::new("/cache"),
            std::io::Error::from(std::io::ErrorKind::AlreadyExists),
        );
        assert!(matches!(error, InstallerError::CreateDir { .. }));
        assert!(error.source().is_some());
    }
}
