// ── Filesystem helpers ──
//
// Every file a run produces is written to a temporary sibling and renamed
// into place, so readers never observe a half-written file.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

/// Mode for zone files, the master configuration and the milter lists.
pub const PUBLIC_FILE_MODE: u32 = 0o644;
/// Mode for DKIM private keys.
pub const PRIVATE_KEY_MODE: u32 = 0o640;
/// Mode for DKIM public keys.
pub const PUBLIC_KEY_MODE: u32 = 0o664;

/// Atomically replace `path` with `contents`, applying `mode` on unix.
pub fn write_atomic(path: &Path, contents: &[u8], mode: u32) -> io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    set_mode(tmp.path(), mode)?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Create `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if !dir.is_dir() {
        info!(path = %dir.display(), "creating directory");
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
pub fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
