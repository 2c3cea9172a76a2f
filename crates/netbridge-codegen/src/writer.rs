//! Writes generated artifacts to the destination directory.
//!
//! Writing happens in two phases. Every file is first staged into a
//! temporary file inside the destination directory; only when all of them
//! are staged are they renamed into place. A failure while staging leaves
//! the destination untouched, and existing artifacts are replaced rather
//! than appended to.

use crate::types::{GeneratedArtifacts, GeneratedFile};
use netbridge_core::{Error, Result};
use std::io::Write as _;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

/// Writes every artifact into `destination` and returns the final paths in
/// artifact order.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if an artifact path would escape the
/// destination, or [`Error::WriteFailed`] on any I/O failure.
///
/// # Examples
///
/// ```
/// use netbridge_codegen::writer::write_artifacts;
/// use netbridge_codegen::{GeneratedArtifacts, GeneratedFile};
/// use tempfile::TempDir;
///
/// let dir = TempDir::new().unwrap();
/// let artifacts = GeneratedArtifacts {
///     files: vec![GeneratedFile {
///         path: "config.toml".to_string(),
///         content: "[source]\n".to_string(),
///     }],
/// };
///
/// let written = write_artifacts(dir.path(), &artifacts).unwrap();
/// assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), "[source]\n");
/// ```
pub fn write_artifacts(destination: &Path, artifacts: &GeneratedArtifacts) -> Result<Vec<PathBuf>> {
    let staged = artifacts
        .files
        .iter()
        .map(|file| stage(destination, file))
        .collect::<Result<Vec<_>>>()?;

    let mut written = Vec::with_capacity(staged.len());
    for (temp, target) in staged {
        temp.persist(&target).map_err(|e| Error::WriteFailed {
            path: target.clone(),
            source: e.error,
        })?;
        tracing::debug!("wrote {}", target.display());
        written.push(target);
    }

    Ok(written)
}

fn stage(destination: &Path, file: &GeneratedFile) -> Result<(NamedTempFile, PathBuf)> {
    let relative = Path::new(&file.path);
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(Error::InvalidInput {
            path: relative.to_path_buf(),
            reason: "artifact path must stay inside the destination".to_string(),
        });
    }

    let target = destination.join(relative);
    let write_failed = |source| Error::WriteFailed {
        path: target.clone(),
        source,
    };

    let mut temp = NamedTempFile::new_in(destination).map_err(write_failed)?;
    temp.write_all(file.content.as_bytes()).map_err(write_failed)?;
    temp.as_file().sync_all().map_err(write_failed)?;

    // Temp files are created 0600
    #[cfg(unix)]
    {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(Permissions::from_mode(0o644))
            .map_err(write_failed)?;
    }

    Ok((temp, target))
}
