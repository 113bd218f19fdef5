use std::path::PathBuf;

use thiserror::Error;

/// I/O-boundary errors: everything that can go wrong reading or writing
/// the on-disk array files `masb-cli` hands the core (spec §6). Kept
/// distinct from [`masb_common::Error`], which is reserved for
/// programmer errors inside the core itself (spec §7) — a failed read
/// here is an environment problem, not a contract violation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("{path}: {source}")]
    ReadNpy { path: PathBuf, #[source] source: ndarray_npy::ReadNpyError },
    #[error("{path}: {source}")]
    WriteNpy { path: PathBuf, #[source] source: ndarray_npy::WriteNpyError },
    #[error("{path}: {source}")]
    Shape { path: PathBuf, #[source] source: masb_common::Error },
}

pub type Result<T> = std::result::Result<T, Error>;
