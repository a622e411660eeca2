use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;
use crate::utils::ConversionError;

const WEBP_EXTENSION: &str = "webp";

/// Compute the WebP destination for `input`.
///
/// Without `output_dir` the extension is swapped in place (`/a/b/photo.JPG` ->
/// `/a/b/photo.webp`). With one, only the file stem is kept and joined onto it
/// (`/out/photo.webp`). The target is not checked: an existing file is overwritten.
pub fn resolve_output_path(input: impl AsRef<Path>, output_dir: Option<&Path>) -> PathBuf {
    let input = input.as_ref();
    match output_dir {
        Some(dir) => {
            let stem = input.file_stem().unwrap_or_else(|| input.as_os_str());
            let mut name = stem.to_os_string();
            name.push(".");
            name.push(WEBP_EXTENSION);
            dir.join(name)
        }
        None => input.with_extension(WEBP_EXTENSION),
    }
}

/// Final path component for display, falling back to the whole path.
pub fn extract_filename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Get file size in bytes, 0 when the file cannot be inspected
pub fn file_size(path: impl AsRef<Path>) -> u64 {
    std::fs::metadata(path.as_ref()).map(|m| m.len()).unwrap_or(0)
}

/// Write `bytes` to `target` through a sibling temporary file and an atomic rename.
///
/// A failure part-way leaves `target` untouched; the temporary file is removed
/// when it is dropped. A cancelled `cancel` token is honoured right before the
/// rename, so only the rename itself can outlive a cancellation.
pub fn write_atomically(
    target: &Path,
    bytes: &[u8],
    cancel: Option<&CancellationToken>,
) -> Result<(), ConversionError> {
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(parent)
        .map_err(|e| ConversionError::CreateOutput(format!("{}: {e}", target.display())))?;

    staged
        .write_all(bytes)
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|e| ConversionError::Write(format!("{}: {e}", target.display())))?;

    if cancel.is_some_and(CancellationToken::is_cancelled) {
        return Err(ConversionError::Cancelled("replacing output".to_string()));
    }

    staged
        .persist(target)
        .map_err(|e| ConversionError::Write(format!("{}: {}", target.display(), e.error)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn resolves_next_to_input_without_output_dir() {
        assert_eq!(
            resolve_output_path("/a/b/photo.JPG", None),
            PathBuf::from("/a/b/photo.webp")
        );
        assert_eq!(resolve_output_path("scan", None), PathBuf::from("scan.webp"));
    }

    #[test]
    fn resolves_into_output_dir() {
        assert_eq!(
            resolve_output_path("/a/b/photo.JPG", Some(Path::new("/out"))),
            PathBuf::from("/out/photo.webp")
        );
        // Only the last extension is replaced.
        assert_eq!(
            resolve_output_path("/a/holiday.2024.png", Some(Path::new("/out"))),
            PathBuf::from("/out/holiday.2024.webp")
        );
    }

    #[test]
    fn atomic_write_overwrites_existing_target() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.webp");
        std::fs::write(&target, b"old contents that are longer").unwrap();

        write_atomically(&target, b"new", None).unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new");
        // No stray temporaries are left next to the target.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn atomic_write_reports_missing_directory_as_create_failure() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing").join("out.webp");

        let err = write_atomically(&target, b"data", None).unwrap_err();
        assert!(matches!(err, ConversionError::CreateOutput(_)));
        assert!(!target.exists());
    }

    #[test]
    fn cancelled_write_keeps_old_target_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.webp");
        std::fs::write(&target, b"previous").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = write_atomically(&target, b"replacement", Some(&cancel)).unwrap_err();

        assert_eq!(err, ConversionError::Cancelled("replacing output".to_string()));
        assert_eq!(std::fs::read(&target).unwrap(), b"previous");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
