// ── Core error types ──
//
// Errors that abort a run. Per-domain problems (bad addresses, dangling
// delegations, failed reloads) are logged and reported, never raised here.

use std::path::PathBuf;

use thiserror::Error;

use crate::exec::ExecError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage ──────────────────────────────────────────────────────
    #[error(transparent)]
    Store(#[from] StoreError),

    // ── Filesystem ───────────────────────────────────────────────────
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── External tools ───────────────────────────────────────────────
    #[error(transparent)]
    Exec(#[from] ExecError),
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
