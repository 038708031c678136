pub mod duplicate_finder;
pub mod scan_worker;

pub use duplicate_finder::DuplicateFinderService;
pub use scan_worker::{ScanEvent, ScanHandle, ScanWorker};
