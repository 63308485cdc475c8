//! Unpacking of the platform `.zip` archives.
//!
//! Each Deno release archive holds a single binary at its root. Entries are
//! validated before anything is written so a crafted archive cannot escape
//! the destination directory.

use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Trait for extracting platform archives, enabling test mocking.
///
/// # Examples
///
/// ```
/// use bin_release::extraction::ZipExtractor;
///
/// let extractor = ZipExtractor;
/// // Use extractor.extract(archive_path, dest_dir) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait BinaryExtractor {
    /// Extract the archive at `archive_path` into `dest_dir`.
    ///
    /// Returns the names of the extracted files.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::PathTraversal`] if any entry attempts to
    /// escape the destination directory, [`ExtractionError::EmptyArchive`] if
    /// no files are found, and [`ExtractionError::Io`] or
    /// [`ExtractionError::Zip`] on read failures.
    fn extract(&self, archive_path: &Path, dest_dir: &Path)
    -> Result<Vec<String>, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not a readable zip archive.
    #[error("invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The archive contains no files.
    #[error("archive contains no files")]
    EmptyArchive,
}

/// Default extractor backed by the `zip` crate.
///
/// Extracted files are made executable on Unix.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl BinaryExtractor for ZipExtractor {
    fn extract(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
    ) -> Result<Vec<String>, ExtractionError> {
        let mut archive = zip::ZipArchive::new(File::open(archive_path)?)?;
        let mut extracted = Vec::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let entry_path = validated_path(entry.name(), entry.enclosed_name())?;
            let dest_path = dest_dir.join(&entry_path);

            if entry.is_dir() {
                std::fs::create_dir_all(&dest_path)?;
                continue;
            }
            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let mut out = File::create(&dest_path)?;
            io::copy(&mut entry, &mut out)?;
            make_executable(&dest_path)?;
            log::trace!("extracted {}", dest_path.display());

            if let Some(name) = entry_path.file_name() {
                extracted.push(name.to_string_lossy().into_owned());
            }
        }

        if extracted.is_empty() {
            return Err(ExtractionError::EmptyArchive);
        }

        Ok(extracted)
    }
}

/// Check the raw entry name for `..` components and absolute paths, then
/// take the sanitized path the archive reader computed.
fn validated_path(raw: &str, enclosed: Option<PathBuf>) -> Result<PathBuf, ExtractionError> {
    let traversal = || ExtractionError::PathTraversal {
        path: raw.to_owned(),
    };
    let path = Path::new(raw);
    let escapes = path.is_absolute()
        || raw.starts_with('/')
        || raw.starts_with('\\')
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
    if escapes {
        return Err(traversal());
    }
    enclosed.ok_or_else(traversal)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
