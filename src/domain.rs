use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Bytes covered by the fast (partial) fingerprint.
pub const FAST_HASH_BYTES: u64 = 4096;

/// Path substrings marking Synology extended-attribute shadow storage.
pub const VENDOR_METADATA_MARKERS: [&str; 2] = ["@eaDir", "@SynoEAStream"];

/// Final scan output: full-content digest to the paths sharing it.
pub type DuplicateMap = BTreeMap<String, Vec<PathBuf>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Blake3,
    Md5,
    Sha1,
    XxHash64,
    XxHash3,
    WyHash,
    TwoXHash64,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Blake3 => "blake3",
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::XxHash64 => "xxhash64",
            HashAlgorithm::XxHash3 => "xxhash3",
            HashAlgorithm::WyHash => "wyhash",
            HashAlgorithm::TwoXHash64 => "twox64",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_hash: Option<String>,
}

impl FileRecord {
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            partial_hash: None,
            full_hash: None,
        }
    }

    pub fn with_partial_hash(mut self, hash: String) -> Self {
        self.partial_hash = Some(hash);
        self
    }

    pub fn with_full_hash(mut self, hash: String) -> Self {
        self.full_hash = Some(hash);
        self
    }
}

/// A set of byte-identical files sharing one full-content digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateSet {
    pub hash: String,
    pub files: Vec<FileRecord>,
    pub total_size: u64,
}

impl DuplicateSet {
    pub fn new(hash: String, files: Vec<FileRecord>) -> Self {
        let total_size = files.iter().map(|f| f.size).sum();
        Self {
            hash,
            files,
            total_size,
        }
    }

    pub fn file_size(&self) -> u64 {
        self.files.first().map_or(0, |f| f.size)
    }

    pub fn wasted_space(&self) -> u64 {
        if self.files.len() <= 1 {
            0
        } else {
            self.total_size - self.file_size()
        }
    }

    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub paths: Vec<PathBuf>,
    pub min_size: u64,
    pub max_depth: Option<usize>,
    pub exclude_markers: Vec<String>,
    pub partial_hash_size: u64,
    pub use_mmap_threshold: u64,
    pub thread_count: Option<usize>,
    pub hash_algorithm: HashAlgorithm,
    pub cross_filesystem: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            paths: vec![PathBuf::from(".")],
            min_size: 1,
            max_depth: None,
            exclude_markers: VENDOR_METADATA_MARKERS.iter().map(|m| m.to_string()).collect(),
            partial_hash_size: FAST_HASH_BYTES,
            use_mmap_threshold: 64 * 1024 * 1024,
            thread_count: None,
            hash_algorithm: HashAlgorithm::default(),
            cross_filesystem: true,
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    /// Zero-byte files stay excluded even with a floor of 0.
    pub fn with_min_size(mut self, size: u64) -> Self {
        self.min_size = size.max(1);
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_exclude_marker(mut self, marker: impl Into<String>) -> Self {
        let marker = marker.into();
        if !marker.is_empty() && !self.exclude_markers.contains(&marker) {
            self.exclude_markers.push(marker);
        }
        self
    }

    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }

    pub fn with_thread_count(mut self, threads: usize) -> Self {
        self.thread_count = Some(threads);
        self
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude_markers.iter().any(|m| path.contains(m.as_str()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanResult {
    pub duplicates: Vec<DuplicateSet>,
    pub total_files_scanned: usize,
    pub total_size_scanned: u64,
    pub total_wasted_space: u64,
}

impl ScanResult {
    pub fn new(duplicates: Vec<DuplicateSet>, total_files_scanned: usize, total_size_scanned: u64) -> Self {
        let total_wasted_space = duplicates.iter().map(|d| d.wasted_space()).sum();
        Self {
            duplicates,
            total_files_scanned,
            total_size_scanned,
            total_wasted_space,
        }
    }

    pub fn total_duplicate_files(&self) -> usize {
        self.duplicates.iter().map(|d| d.duplicate_count()).sum()
    }

    pub fn duplicate_groups(&self) -> usize {
        self.duplicates.len()
    }

    pub fn into_map(self) -> DuplicateMap {
        self.duplicates
            .into_iter()
            .map(|set| (set.hash, set.files.into_iter().map(|f| f.path).collect()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, size: u64) -> FileRecord {
        FileRecord::new(PathBuf::from(path), size)
    }

    #[test]
    fn wasted_space_excludes_one_copy() {
        let set = DuplicateSet::new("h".into(), vec![record("/a", 10), record("/b", 10), record("/c", 10)]);
        assert_eq!(set.total_size, 30);
        assert_eq!(set.wasted_space(), 20);
        assert_eq!(set.duplicate_count(), 2);
    }

    #[test]
    fn scan_result_converts_to_digest_map() {
        let result = ScanResult::new(
            vec![DuplicateSet::new("abc".into(), vec![record("/x/a", 4), record("/x/b", 4)])],
            5,
            100,
        );
        assert_eq!(result.total_wasted_space, 4);
        let map = result.into_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map["abc"], vec![PathBuf::from("/x/a"), PathBuf::from("/x/b")]);
    }

    #[test]
    fn default_config_excludes_vendor_markers() {
        let config = ScanConfig::new().with_min_size(0);
        assert_eq!(config.min_size, 1);
        assert!(config.is_excluded("/volume1/photos/@eaDir/img.jpg"));
        assert!(config.is_excluded("/volume1/photos/img.jpg@SynoEAStream"));
        assert!(config.is_excluded("/volume1/x@eaDirectory/file"));
        assert!(!config.is_excluded("/volume1/photos/img.jpg"));
    }

    #[test]
    fn extra_markers_are_deduplicated() {
        let config = ScanConfig::new()
            .with_exclude_marker(".cache")
            .with_exclude_marker(".cache")
            .with_exclude_marker("");
        assert_eq!(config.exclude_markers.len(), VENDOR_METADATA_MARKERS.len() + 1);
        assert!(config.is_excluded("/home/u/.cache/f"));
    }
}
