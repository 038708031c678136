use crate::adapters::{FileSystemAdapter, MultiAlgorithmHasher, NoProgress};
use crate::domain::{ScanConfig, ScanResult};
use crate::error::ScanError;
use crate::ports::ProgressPort;
use crate::services::DuplicateFinderService;
use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Messages sent from a running scan to its [`ScanHandle`].
#[derive(Debug)]
pub enum ScanEvent {
    Started { total_files: u64 },
    Progress(u8),
    Finished(Result<ScanResult, ScanError>),
}

/// Progress sink living on the worker thread; repeats of the same percentage are not resent.
struct ChannelProgress {
    tx: Sender<ScanEvent>,
    last: Cell<Option<u8>>,
}

impl ProgressPort for ChannelProgress {
    fn start(&self, total_files: u64) {
        let _ = self.tx.send(ScanEvent::Started { total_files });
    }

    fn report(&self, percent: u8) {
        if self.last.replace(Some(percent)) != Some(percent) {
            let _ = self.tx.send(ScanEvent::Progress(percent));
        }
    }

    fn finish(&self) {}
}

/// Runs one scan on a dedicated thread.
///
/// Callers serialize scans themselves: spawn a new worker only after the previous handle
/// has delivered its result.
pub struct ScanWorker {
    config: ScanConfig,
}

impl ScanWorker {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn spawn(self) -> Result<ScanHandle, ScanError> {
        let (tx, rx) = mpsc::channel();
        let config = self.config;

        let thread = thread::Builder::new()
            .name("dupescan-worker".into())
            .spawn(move || {
                let hasher = MultiAlgorithmHasher::new().with_mmap_threshold(config.use_mmap_threshold);
                let progress = ChannelProgress {
                    tx: tx.clone(),
                    last: Cell::new(None),
                };
                let finder = DuplicateFinderService::new(FileSystemAdapter::new(), hasher, progress);
                let result = finder.find_duplicates(&config);
                if tx.send(ScanEvent::Finished(result)).is_err() {
                    log::debug!("scan result dropped: handle went away");
                }
            })
            .map_err(ScanError::WorkerSpawn)?;

        Ok(ScanHandle {
            events: rx,
            thread: Some(thread),
        })
    }
}

pub struct ScanHandle {
    events: Receiver<ScanEvent>,
    thread: Option<JoinHandle<()>>,
}

impl ScanHandle {
    /// Next pending event without blocking.
    pub fn try_event(&self) -> Option<ScanEvent> {
        self.events.try_recv().ok()
    }

    /// Blocks for the next event; `None` once the worker is gone.
    pub fn next_event(&self) -> Option<ScanEvent> {
        self.events.recv().ok()
    }

    /// Blocks until the scan finishes, replaying progress into `progress` on this thread.
    pub fn wait_with<P: ProgressPort>(mut self, progress: &P) -> Result<ScanResult, ScanError> {
        let outcome = loop {
            match self.events.recv() {
                Ok(ScanEvent::Started { total_files }) => progress.start(total_files),
                Ok(ScanEvent::Progress(percent)) => progress.report(percent),
                Ok(ScanEvent::Finished(result)) => break result,
                Err(_) => break Err(ScanError::WorkerLost),
            }
        };
        progress.finish();

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("scan worker panicked");
            }
        }
        outcome
    }

    pub fn wait(self) -> Result<ScanResult, ScanError> {
        self.wait_with(&NoProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::CallbackProgress;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn worker_delivers_result_off_thread() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a"), b"twin").unwrap();
        fs::write(dir.path().join("b"), b"twin").unwrap();
        fs::write(dir.path().join("c"), b"solo!").unwrap();

        let config = ScanConfig::new().with_paths(vec![dir.path().to_path_buf()]);
        let handle = ScanWorker::new(config).spawn().unwrap();
        let seen = RefCell::new(Vec::new());
        let result = handle
            .wait_with(&CallbackProgress::new(|p| seen.borrow_mut().push(p)))
            .unwrap();

        assert_eq!(result.duplicate_groups(), 1);
        assert_eq!(result.duplicates[0].files.len(), 2);
        let seen = seen.into_inner();
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn events_start_and_end_in_order() {
        let dir = tempdir().unwrap();
        let config = ScanConfig::new().with_paths(vec![dir.path().to_path_buf()]);
        let handle = ScanWorker::new(config).spawn().unwrap();

        let mut events = Vec::new();
        while let Some(event) = handle.next_event() {
            let done = matches!(event, ScanEvent::Finished(_));
            events.push(event);
            if done {
                break;
            }
        }

        assert!(matches!(events[0], ScanEvent::Started { total_files: 0 }));
        assert!(matches!(events[1], ScanEvent::Progress(0)));
        assert!(matches!(events[2], ScanEvent::Progress(100)));
        assert!(matches!(&events[3], ScanEvent::Finished(Ok(r)) if r.duplicates.is_empty()));
        assert!(handle.try_event().is_none());
    }
}
