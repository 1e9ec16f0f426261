use std::io;
use std::path::Path;
use tempfile::TempPath;
use tracing::{debug, warn};

/// A per-request staging file on local disk.
///
/// The path is unique per allocation (random suffix). Call [`StagedFile::cleanup`]
/// once the request is done with it; if the guard is dropped without that (the
/// request future was cancelled, or a panic unwound through it) the file is
/// still removed on drop.
pub struct StagedFile {
    path: TempPath,
}

impl StagedFile {
    /// Allocates an empty staging file inside `dir`.
    pub fn allocate(dir: &Path) -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("relay-")
            .tempfile_in(dir)?;
        let path = file.into_temp_path();
        debug!("Allocated staging file {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the staging file. Failures are logged, never returned.
    pub fn cleanup(self) {
        let shown = self.path.display().to_string();
        match self.path.close() {
            Ok(()) => debug!("Removed staging file {}", shown),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("⚠️  Failed to remove staging file {}: {}", shown, e),
        }
    }
}
