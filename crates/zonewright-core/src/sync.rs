// ── Stale zone pruning ──

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::CoreError;

/// Zone file names written during a run.
///
/// Anything else left in the zone directory belongs to a domain that was
/// removed or renamed and is deleted by [`FileSyncer::prune`].
#[derive(Debug, Clone, Default)]
pub struct FileSyncer {
    known: HashSet<String>,
}

impl FileSyncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, file_name: impl Into<String>) {
        self.known.insert(file_name.into());
    }

    /// Delete every regular file in `dir` that was not recorded.
    ///
    /// Must run after the name server has been reloaded, so it never
    /// references a file that is gone. Returns the removed paths.
    pub fn prune(&self, dir: &Path) -> Result<Vec<PathBuf>, CoreError> {
        let mut removed = Vec::new();
        let entries = std::fs::read_dir(dir).map_err(CoreError::io(dir))?;

        for entry in entries {
            let entry = entry.map_err(CoreError::io(dir))?;
            let path = entry.path();
            // Follows symlinks, so links to directories are left alone.
            if !path.is_file() {
                continue;
            }
            let name = entry.file_name();
            if self.known.contains(&*name.to_string_lossy()) {
                continue;
            }
            warn!(path = %path.display(), "deleting stale zone file");
            std::fs::remove_file(&path).map_err(CoreError::io(&path))?;
            removed.push(path);
        }

        debug!(kept = self.known.len(), removed = removed.len(), "zone directory pruned");
        removed.sort();
        Ok(removed)
    }
}
