use crate::domain::{FileRecord, HashAlgorithm, ScanConfig, ScanResult};
use anyhow::Result;
use std::path::Path;

pub trait FileSystemPort {
    /// Eligible regular files beneath the configured roots, in discovery order.
    fn scan_files(&self, config: &ScanConfig) -> Result<Vec<FileRecord>>;
}

pub trait HashingPort {
    fn hash_file(&self, path: &Path, algorithm: HashAlgorithm) -> Result<String>;
    fn hash_partial(&self, path: &Path, bytes: u64, algorithm: HashAlgorithm) -> Result<String>;
}

pub trait OutputPort {
    fn write_results(&self, results: &ScanResult) -> Result<()>;
}

/// Observer for scan progress. Called synchronously from the scanning thread.
pub trait ProgressPort {
    fn start(&self, total_files: u64);
    fn report(&self, percent: u8);
    fn finish(&self);
}
