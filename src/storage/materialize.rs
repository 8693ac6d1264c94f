//! Atomic materialization of downloaded content
//!
//! Downloaded bytes are written to a uniquely named temporary file in the
//! destination's directory and renamed into place, so a concurrent reader
//! of the destination path never observes a truncated or partial file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::TransferError;

/// Write `data` to `destination` atomically, applying `mode` when given.
///
/// The temporary file is cleaned up best-effort on failure.
pub fn materialize(data: &[u8], destination: &Path, mode: Option<u32>) -> Result<(), TransferError> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp_path = dir.join(format!(".shuttlr-{}.tmp", uuid::Uuid::new_v4()));

    match write_and_rename(data, &temp_path, destination, mode) {
        Ok(()) => Ok(()),
        Err(source) => {
            if let Err(e) = fs::remove_file(&temp_path) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(
                        path = %temp_path.display(),
                        error = %e,
                        "failed to clean up temp file"
                    );
                }
            }
            Err(TransferError::Materialize {
                path: destination.to_path_buf(),
                source,
            })
        }
    }
}

fn write_and_rename(
    data: &[u8],
    temp_path: &Path,
    destination: &Path,
    mode: Option<u32>,
) -> io::Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(data)?;
    file.flush()?;

    #[cfg(unix)]
    if let Some(mode) = mode {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    drop(file);
    fs::rename(temp_path, destination)
}
