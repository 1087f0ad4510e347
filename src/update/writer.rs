use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::update::error::UpdateError;

/// Replace the file at `path` with `content` atomically
///
/// The content goes to a temporary file in the same directory, which then
/// takes over the original's permissions and is renamed over it.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), UpdateError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    if let Ok(metadata) = std::fs::metadata(path) {
        file.as_file().set_permissions(metadata.permissions())?;
    }

    file.write_all(content.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path)?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_atomic_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".travis.yml");
        std::fs::write(&path, "rvm:\n  - 2.2.8\n").unwrap();

        write_atomic(&path, "rvm:\n  - 2.2.9\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "rvm:\n  - 2.2.9\n");
    }

    #[test]
    fn write_atomic_leaves_no_temporary_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".travis.yml");
        std::fs::write(&path, "rvm: []\n").unwrap();

        write_atomic(&path, "rvm: [2.4.1]\n").unwrap();

        let entries: Vec<_> = std::fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn write_atomic_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".travis.yml");
        std::fs::write(&path, "rvm: []\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(&path, "rvm: [2.4.1]\n").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}
