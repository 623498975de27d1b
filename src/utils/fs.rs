use crate::error::{InstallerError, Result};
use std::path::Path;

/// Creates `path` and any missing parents with full permissions (masked by umask).
pub fn create_dir_all_permissive(path: &Path) -> Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o777);
    }

    builder
        .create(path)
        .map_err(|e| InstallerError::create_dir(path, e))
}

pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        create_dir_all_permissive(path)?;
    }
    Ok(())
}

/// True when something other than a directory exists at `path`.
/// Any stat failure counts as absent.
pub fn is_cached_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| !meta.is_dir())
        .unwrap_or(false)
}

pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(perms.mode() | 0o755);
        std::fs::set_permissions(path, perms)?;
    }

    #[cfg(windows)]
    {
        let _ = path;
    }

    Ok(())
}
