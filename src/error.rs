//! Scan-level errors.
//!
//! Per-file problems (unreadable files, vanished entries, symlinks) never show up here;
//! they are logged and the file is dropped. A `ScanError` means the scan produced no result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// The filesystem port failed as a whole. The bundled `FileSystemAdapter` skips
    /// unreadable roots and entries instead, so this comes from custom discovery ports.
    #[error("file discovery failed: {0:#}")]
    Discovery(anyhow::Error),

    #[error("failed to configure hashing thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to start scan worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The worker thread ended (panicked) before delivering a result.
    #[error("scan worker terminated without a result")]
    WorkerLost,
}
