use crate::domain::{FileRecord, ScanConfig};
use crate::ports::FileSystemPort;
use anyhow::Result;
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub struct FileSystemAdapter;

impl FileSystemAdapter {
    pub fn new() -> Self {
        Self
    }

    fn walk_root(&self, root: &Path, config: &ScanConfig) -> Vec<FileRecord> {
        // Existence and is_dir follow links; the root itself must not be one.
        let is_plain_dir = root.is_dir()
            && fs::symlink_metadata(root).is_ok_and(|m| !m.file_type().is_symlink());
        if !is_plain_dir {
            log::debug!("skipping root {}: not a directory", root.display());
            return Vec::new();
        }

        // Canonical roots make `a`, `b/../a` and paths through linked ancestors agree, so the
        // path-keyed dedup in `scan_files` sees one file once.
        let root = match fs::canonicalize(root) {
            Ok(root) => root,
            Err(e) => {
                log::debug!("skipping root {}: {}", root.display(), e);
                return Vec::new();
            }
        };

        let exclusions = config.clone();
        let mut builder = WalkBuilder::new(&root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .max_depth(config.max_depth)
            .same_file_system(!config.cross_filesystem)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| !exclusions.is_excluded(&entry.path().to_string_lossy()));

        builder
            .build()
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        log::warn!("skipping unreadable entry: {}", e);
                        return None;
                    }
                };

                let file_type = entry.file_type()?;
                if file_type.is_symlink() || entry.path_is_symlink() {
                    log::trace!("skipping symlink {}", entry.path().display());
                    return None;
                }
                if !file_type.is_file() {
                    return None;
                }

                let size = match entry.metadata() {
                    Ok(metadata) => metadata.len(),
                    Err(e) => {
                        log::debug!("skipping {}: {}", entry.path().display(), e);
                        return None;
                    }
                };
                if size == 0 || size < config.min_size {
                    return None;
                }

                Some(FileRecord::new(entry.into_path(), size))
            })
            .collect()
    }
}

impl Default for FileSystemAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystemPort for FileSystemAdapter {
    fn scan_files(&self, config: &ScanConfig) -> Result<Vec<FileRecord>> {
        let per_root: Vec<Vec<FileRecord>> = config
            .paths
            .par_iter()
            .map(|root| self.walk_root(root, config))
            .collect();

        let mut seen: HashSet<PathBuf> = HashSet::new();
        let files: Vec<FileRecord> = per_root
            .into_iter()
            .flatten()
            .filter(|file| seen.insert(file.path.clone()))
            .collect();

        log::info!("discovered {} eligible files", files.len());
        Ok(files)
    }
}
