pub mod filesystem;
pub mod multi_hasher;
pub mod output;
pub mod progress;

pub use filesystem::FileSystemAdapter;
pub use multi_hasher::MultiAlgorithmHasher;
pub use output::{ConsoleOutputAdapter, CsvOutputAdapter, JsonOutputAdapter, TreeOutputAdapter};
pub use progress::{CallbackProgress, NoProgress, ProgressBarAdapter};
