use crate::domain::{FAST_HASH_BYTES, HashAlgorithm, ScanConfig};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, ValueEnum)]
pub enum HashAlgorithmChoice {
    #[value(help = "Cryptographic hash (default)")]
    Sha256,
    #[value(help = "Cryptographic hash")]
    Blake3,
    #[value(help = "Slow legacy hash")]
    Md5,
    #[value(help = "Slow legacy hash")]
    Sha1,
    #[value(help = "Fast non-cryptographic hash")]
    Xxhash64,
    #[value(help = "xxHash variant, fast non-cryptographic hash")]
    Xxhash3,
    #[value(help = "Fast non-cryptographic hash")]
    Wyhash,
    #[value(help = "Fast non-cryptographic hash")]
    Twox64,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
    Tree,
}

impl From<HashAlgorithmChoice> for HashAlgorithm {
    fn from(choice: HashAlgorithmChoice) -> Self {
        match choice {
            HashAlgorithmChoice::Sha256 => HashAlgorithm::Sha256,
            HashAlgorithmChoice::Blake3 => HashAlgorithm::Blake3,
            HashAlgorithmChoice::Md5 => HashAlgorithm::Md5,
            HashAlgorithmChoice::Sha1 => HashAlgorithm::Sha1,
            HashAlgorithmChoice::Xxhash64 => HashAlgorithm::XxHash64,
            HashAlgorithmChoice::Xxhash3 => HashAlgorithm::XxHash3,
            HashAlgorithmChoice::Wyhash => HashAlgorithm::WyHash,
            HashAlgorithmChoice::Twox64 => HashAlgorithm::TwoXHash64,
        }
    }
}

#[derive(Parser)]
#[command(name = "dupescan")]
#[command(about = "Find duplicate files by size, partial hash and full hash")]
#[command(version)]
pub struct Cli {
    #[arg(help = "Directories to scan for duplicates")]
    pub paths: Vec<PathBuf>,

    #[arg(
        short = 's',
        long = "min-size",
        help = "Minimum file size in bytes to consider (empty files are always skipped)",
        default_value = "1"
    )]
    pub min_size: u64,

    #[arg(short = 'd', long = "max-depth", help = "Maximum directory depth to scan")]
    pub max_depth: Option<usize>,

    #[arg(
        short = 'e',
        long = "exclude",
        help = "Skip files whose path contains this text (in addition to @eaDir and @SynoEAStream)",
        action = ArgAction::Append
    )]
    pub exclude: Vec<String>,

    #[arg(short = 'q', long = "quiet", help = "Suppress progress output and non-error logs")]
    pub quiet: bool,

    #[arg(
        short = 'v',
        long = "verbose",
        help = "Increase log verbosity (-v info, -vv debug, -vvv trace)",
        action = ArgAction::Count
    )]
    pub verbose: u8,

    #[arg(short = 'j', long = "threads", help = "Number of threads to use for hashing")]
    pub threads: Option<usize>,

    #[arg(
        long = "partial-hash-size",
        help = "Bytes read from the start of each file for the quick hash",
        default_value_t = FAST_HASH_BYTES
    )]
    pub partial_hash_size: u64,

    #[arg(
        long = "mmap-threshold",
        help = "File size threshold for using memory mapping",
        default_value = "67108864"
    )]
    pub mmap_threshold: u64,

    #[arg(
        short = 'a',
        long = "algorithm",
        help = "Hash algorithm to use",
        value_enum,
        default_value = "sha256"
    )]
    pub hash_algorithm: HashAlgorithmChoice,

    #[arg(long = "no-cross-filesystem", help = "Do not cross filesystem boundaries")]
    pub no_cross_filesystem: bool,

    #[arg(
        long = "summary-only",
        help = "Show only summary statistics, not detailed duplicate groups"
    )]
    pub summary_only: bool,

    #[arg(
        short = 'f',
        long = "format",
        help = "Output format",
        value_enum,
        default_value = "text"
    )]
    pub output_format: OutputFormat,

    #[arg(short = 'o', long = "output", help = "Output file path (stdout if not specified)")]
    pub output_file: Option<PathBuf>,
}

impl Cli {
    pub fn to_scan_config(&self) -> ScanConfig {
        let paths = if self.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.paths.clone()
        };

        let mut config = ScanConfig::new()
            .with_paths(paths)
            .with_min_size(self.min_size)
            .with_hash_algorithm(self.hash_algorithm.clone().into());

        if let Some(max_depth) = self.max_depth {
            config = config.with_max_depth(max_depth);
        }
        if let Some(threads) = self.threads {
            config = config.with_thread_count(threads);
        }
        for marker in &self.exclude {
            config = config.with_exclude_marker(marker.as_str());
        }

        config.partial_hash_size = self.partial_hash_size.max(1);
        config.use_mmap_threshold = self.mmap_threshold;
        config.cross_filesystem = !self.no_cross_filesystem;

        config
    }
}
