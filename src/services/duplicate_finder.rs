use crate::domain::{DuplicateSet, FileRecord, ScanConfig, ScanResult};
use crate::error::ScanError;
use crate::ports::{FileSystemPort, HashingPort, ProgressPort};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HashStage {
    Partial,
    Full,
}

/// Cumulative percentage over a denominator fixed before partitioning.
///
/// Files surviving to the full-hash stage are counted once per stage, so the raw ratio can
/// pass 100 before the scan ends; reported values are clamped.
struct ProgressTracker<'a, P: ProgressPort> {
    sink: &'a P,
    total: usize,
    processed: usize,
}

impl<'a, P: ProgressPort> ProgressTracker<'a, P> {
    fn start(sink: &'a P, total: usize) -> Self {
        sink.start(total as u64);
        if total == 0 {
            sink.report(0);
        }
        Self {
            sink,
            total,
            processed: 0,
        }
    }

    fn advance(&mut self, files: usize) {
        self.processed += files;
        self.sink.report(percent(self.processed, self.total));
    }

    fn complete(self) {
        self.sink.report(100);
        self.sink.finish();
    }
}

fn percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (processed.saturating_mul(100) / total).min(100) as u8
}

/// Groups values by key, keeping first-seen key order and insertion order inside groups.
fn group_in_order<K, V>(items: impl IntoIterator<Item = (K, V)>) -> Vec<(K, Vec<V>)>
where
    K: Eq + Hash + Clone,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<V>)> = Vec::new();
    for (key, value) in items {
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(value),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![value]));
            }
        }
    }
    groups
}

pub struct DuplicateFinderService<F, H, P> {
    filesystem: F,
    hasher: H,
    progress: P,
}

impl<F, H, P> DuplicateFinderService<F, H, P>
where
    F: FileSystemPort,
    H: HashingPort + Sync,
    P: ProgressPort,
{
    pub fn new(filesystem: F, hasher: H, progress: P) -> Self {
        Self {
            filesystem,
            hasher,
            progress,
        }
    }

    /// Runs discovery, size partitioning and both fingerprint passes.
    ///
    /// Per-file failures drop the file; only a failure of the whole pipeline is an error.
    pub fn find_duplicates(&self, config: &ScanConfig) -> Result<ScanResult, ScanError> {
        let pool = match config.thread_count {
            Some(threads) => Some(rayon::ThreadPoolBuilder::new().num_threads(threads).build()?),
            None => None,
        };

        let files = self.filesystem.scan_files(config).map_err(ScanError::Discovery)?;
        let total_files = files.len();
        let total_size: u64 = files.iter().map(|f| f.size).sum();

        let mut tracker = ProgressTracker::start(&self.progress, total_files);

        let size_buckets = group_in_order(files.into_iter().map(|f| (f.size, f)));
        log::debug!("{} files in {} size buckets", total_files, size_buckets.len());

        let partial_buckets = self.partial_pass(size_buckets, config, pool.as_ref(), &mut tracker);
        log::debug!(
            "{} partial-hash buckets with candidates",
            partial_buckets.iter().filter(|b| b.len() > 1).count()
        );

        let duplicates = self.full_pass(partial_buckets, config, pool.as_ref(), &mut tracker);
        tracker.complete();

        let result = ScanResult::new(duplicates, total_files, total_size);
        log::info!(
            "found {} duplicate groups ({} redundant files) among {} files",
            result.duplicate_groups(),
            result.total_duplicate_files(),
            result.total_files_scanned
        );
        Ok(result)
    }

    /// Fingerprints the head of every file in a multi-member size bucket and splits each
    /// bucket by that fingerprint. Buckets are never merged across sizes.
    fn partial_pass(
        &self,
        size_buckets: Vec<(u64, Vec<FileRecord>)>,
        config: &ScanConfig,
        pool: Option<&ThreadPool>,
        tracker: &mut ProgressTracker<'_, P>,
    ) -> Vec<Vec<FileRecord>> {
        let mut buckets = Vec::new();
        for (_, group) in size_buckets {
            if group.len() < 2 {
                tracker.advance(group.len());
                continue;
            }

            let hashed = self.hash_group(group, config, pool, HashStage::Partial);
            let mut survivors = Vec::with_capacity(hashed.len());
            for file in hashed {
                if let Some(hash) = file.partial_hash.clone() {
                    survivors.push((hash, file));
                }
                tracker.advance(1);
            }
            buckets.extend(group_in_order(survivors).into_iter().map(|(_, files)| files));
        }
        buckets
    }

    /// Fingerprints full content of every file in a multi-member partial bucket. Only
    /// digests shared by two or more files are returned.
    fn full_pass(
        &self,
        partial_buckets: Vec<Vec<FileRecord>>,
        config: &ScanConfig,
        pool: Option<&ThreadPool>,
        tracker: &mut ProgressTracker<'_, P>,
    ) -> Vec<DuplicateSet> {
        let mut confirmed = Vec::new();
        for group in partial_buckets {
            if group.len() < 2 {
                tracker.advance(group.len());
                continue;
            }

            let hashed = self.hash_group(group, config, pool, HashStage::Full);
            let mut survivors = Vec::with_capacity(hashed.len());
            for file in hashed {
                if let Some(hash) = file.full_hash.clone() {
                    survivors.push((hash, file));
                }
                tracker.advance(1);
            }
            confirmed.extend(
                group_in_order(survivors)
                    .into_iter()
                    .filter(|(_, files)| files.len() > 1)
                    .map(|(hash, files)| DuplicateSet::new(hash, files)),
            );
        }
        confirmed
    }

    /// Hashes one bucket, possibly in parallel. Output keeps input order; files whose
    /// digest could not be computed come back without one for that stage.
    fn hash_group(
        &self,
        group: Vec<FileRecord>,
        config: &ScanConfig,
        pool: Option<&ThreadPool>,
        stage: HashStage,
    ) -> Vec<FileRecord> {
        let hasher = &self.hasher;
        let work = move || -> Vec<FileRecord> {
            group
                .into_par_iter()
                .map(|file| {
                    let hash_result = match stage {
                        HashStage::Partial => {
                            let bytes = config.partial_hash_size;
                            hasher.hash_partial(&file.path, bytes, config.hash_algorithm)
                        }
                        HashStage::Full => hasher.hash_file(&file.path, config.hash_algorithm),
                    };

                    match (hash_result, stage) {
                        (Ok(hash), HashStage::Partial) => file.with_partial_hash(hash),
                        (Ok(hash), HashStage::Full) => file.with_full_hash(hash),
                        (Err(e), _) => {
                            log::warn!("dropping {}: {:#}", file.path.display(), e);
                            file
                        }
                    }
                })
                .collect()
        };

        match pool {
            Some(pool) => pool.install(work),
            None => work(),
        }
    }
}
