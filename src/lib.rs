//! Duplicate file detection by size, then a partial-content hash, then a full-content hash.
//!
//! [`scan`] is the one-call entry point. [`services::DuplicateFinderService`] exposes the
//! same pipeline over pluggable [`ports`], and [`services::ScanWorker`] runs it on a
//! background thread.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod error;
pub mod logging;
pub mod ports;
pub mod services;

pub use domain::{DuplicateMap, DuplicateSet, FileRecord, HashAlgorithm, ScanConfig, ScanResult};
pub use error::ScanError;

use adapters::{CallbackProgress, FileSystemAdapter, MultiAlgorithmHasher};
use services::DuplicateFinderService;
use std::path::Path;

/// Scans `roots` and returns every set of byte-identical files, keyed by SHA-256 digest.
///
/// Roots that are missing or not directories are skipped. `on_progress` receives a
/// non-decreasing percentage on the calling thread and always ends with 100.
pub fn scan<P: AsRef<Path>>(
    roots: &[P],
    on_progress: Option<&dyn Fn(u8)>,
) -> Result<DuplicateMap, ScanError> {
    let paths = roots.iter().map(|r| r.as_ref().to_path_buf()).collect();
    let config = ScanConfig::new().with_paths(paths);
    let progress = CallbackProgress::new(|percent| {
        if let Some(callback) = on_progress {
            callback(percent);
        }
    });

    let finder = DuplicateFinderService::new(
        FileSystemAdapter::new(),
        MultiAlgorithmHasher::new().with_mmap_threshold(config.use_mmap_threshold),
        progress,
    );
    Ok(finder.find_duplicates(&config)?.into_map())
}
