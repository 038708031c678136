use crate::domain::{FileRecord, ScanResult};
use crate::ports::OutputPort;
use anyhow::{Context, Result};
use console::style;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / 1_048_576.0
}

fn short_hash(hash: &str) -> &str {
    hash.get(..16).unwrap_or(hash)
}

struct OutputWriter {
    output_file: Option<PathBuf>,
}

impl OutputWriter {
    fn new() -> Self {
        Self { output_file: None }
    }

    fn with_file(path: &Path) -> Self {
        Self {
            output_file: Some(path.to_path_buf()),
        }
    }

    fn write_content(&self, content: &str) -> Result<()> {
        match &self.output_file {
            Some(path) => {
                std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(content.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

pub struct ConsoleOutputAdapter {
    writer: OutputWriter,
    summary_only: bool,
}

impl ConsoleOutputAdapter {
    pub fn new() -> Self {
        Self {
            writer: OutputWriter::new(),
            summary_only: false,
        }
    }

    pub fn with_file(path: &Path) -> Self {
        Self {
            writer: OutputWriter::with_file(path),
            summary_only: false,
        }
    }

    pub fn with_summary_only(mut self, summary_only: bool) -> Self {
        self.summary_only = summary_only;
        self
    }

    fn format_text(&self, results: &ScanResult) -> String {
        let mut output = String::new();

        if !self.summary_only && !results.duplicates.is_empty() {
            let _ = writeln!(output, "\n{}", style("=== Duplicate Groups ===").bold());
            for (i, group) in results.duplicates.iter().enumerate() {
                let _ = writeln!(
                    output,
                    "\nGroup {} (Hash: {}) {} files, {:.2} MB each",
                    i + 1,
                    style(short_hash(&group.hash)).cyan(),
                    group.files.len(),
                    megabytes(group.file_size())
                );
                for file in &group.files {
                    let _ = writeln!(output, "  - {}", file.path.display());
                }
            }
        }

        let _ = writeln!(output, "\n{}", style("=== Duplicate File Scan Results ===").bold());
        let _ = writeln!(output, "Total files scanned: {}", results.total_files_scanned);
        let _ = writeln!(output, "Total size scanned: {:.2} MB", megabytes(results.total_size_scanned));
        let _ = writeln!(output, "Duplicate groups found: {}", results.duplicate_groups());
        let _ = writeln!(output, "Total duplicate files: {}", results.total_duplicate_files());
        let _ = writeln!(output, "Wasted space: {:.2} MB", megabytes(results.total_wasted_space));

        if results.duplicates.is_empty() {
            let _ = writeln!(output, "\n{}", style("No duplicates found!").green());
        }
        output
    }
}

impl Default for ConsoleOutputAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputPort for ConsoleOutputAdapter {
    fn write_results(&self, results: &ScanResult) -> Result<()> {
        self.writer.write_content(&self.format_text(results))
    }
}

pub struct JsonOutputAdapter {
    writer: OutputWriter,
}

impl JsonOutputAdapter {
    pub fn with_file(path: &Path) -> Self {
        Self {
            writer: OutputWriter::with_file(path),
        }
    }

    pub fn with_stdout() -> Self {
        Self {
            writer: OutputWriter::new(),
        }
    }
}

impl OutputPort for JsonOutputAdapter {
    fn write_results(&self, results: &ScanResult) -> Result<()> {
        let json = serde_json::to_string_pretty(results)?;
        self.writer.write_content(&format!("{}\n", json))
    }
}

pub struct CsvOutputAdapter {
    writer: OutputWriter,
}

impl CsvOutputAdapter {
    pub fn with_file(path: &Path) -> Self {
        Self {
            writer: OutputWriter::with_file(path),
        }
    }

    pub fn with_stdout() -> Self {
        Self {
            writer: OutputWriter::new(),
        }
    }

    fn format_csv_string(&self, results: &ScanResult) -> String {
        let mut output = String::new();
        output.push_str("group_id,hash,file_path,file_size,group_size,wasted_space\n");
        for (group_id, group) in results.duplicates.iter().enumerate() {
            for file in &group.files {
                let _ = writeln!(
                    output,
                    "{},{},{},{},{},{}",
                    group_id + 1,
                    group.hash,
                    csv_field(&file.path.display().to_string()),
                    file.size,
                    group.total_size,
                    group.wasted_space()
                );
            }
        }
        output
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

impl OutputPort for CsvOutputAdapter {
    fn write_results(&self, results: &ScanResult) -> Result<()> {
        self.writer.write_content(&self.format_csv_string(results))
    }
}

pub struct TreeOutputAdapter {
    writer: OutputWriter,
}

impl TreeOutputAdapter {
    pub fn with_file(path: &Path) -> Self {
        Self {
            writer: OutputWriter::with_file(path),
        }
    }

    pub fn with_stdout() -> Self {
        Self {
            writer: OutputWriter::new(),
        }
    }

    fn format_tree_output(&self, results: &ScanResult) -> String {
        let mut output = String::new();
        output.push_str("=== Duplicate File Tree ===\n");
        let _ = writeln!(output, "Total files scanned: {}", results.total_files_scanned);
        let _ = writeln!(output, "Duplicate groups found: {}", results.duplicate_groups());
        let _ = writeln!(output, "Wasted space: {:.2} MB\n", megabytes(results.total_wasted_space));

        if results.duplicates.is_empty() {
            output.push_str("No duplicates found!\n");
            return output;
        }

        for (i, group) in results.duplicates.iter().enumerate() {
            let _ = writeln!(
                output,
                "Duplicate Group {} [{} files, {:.2} MB each, {:.2} MB wasted]",
                i + 1,
                group.files.len(),
                megabytes(group.file_size()),
                megabytes(group.wasted_space())
            );
            let _ = writeln!(output, "|-- Hash: {}", short_hash(&group.hash));

            let mut dir_files: BTreeMap<&Path, Vec<&FileRecord>> = BTreeMap::new();
            for file in &group.files {
                let parent = file.path.parent().unwrap_or(Path::new("/"));
                dir_files.entry(parent).or_default().push(file);
            }

            let dir_count = dir_files.len();
            for (dir_idx, (dir, files)) in dir_files.iter().enumerate() {
                let is_last_dir = dir_idx == dir_count - 1;
                let dir_prefix = if is_last_dir { "`-- " } else { "|-- " };
                let file_prefix = if is_last_dir { "    " } else { "|   " };
                let _ = writeln!(output, "{}{}/", dir_prefix, dir.display());

                for (file_idx, file) in files.iter().enumerate() {
                    let file_marker = if file_idx == files.len() - 1 { "`-- " } else { "|-- " };
                    if let Some(name) = file.path.file_name() {
                        let _ = writeln!(output, "{}{}{}", file_prefix, file_marker, name.to_string_lossy());
                    }
                }
            }

            if i < results.duplicates.len() - 1 {
                output.push('\n');
            }
        }
        output
    }
}

impl OutputPort for TreeOutputAdapter {
    fn write_results(&self, results: &ScanResult) -> Result<()> {
        self.writer.write_content(&self.format_tree_output(results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DuplicateSet;

    fn sample() -> ScanResult {
        let files = vec![
            FileRecord::new(PathBuf::from("/photos/a.jpg"), 2048),
            FileRecord::new(PathBuf::from("/photos/b.jpg"), 2048),
            FileRecord::new(PathBuf::from("/backup/a,copy.jpg"), 2048),
        ];
        ScanResult::new(vec![DuplicateSet::new("0123456789abcdef0123".into(), files)], 10, 65536)
    }

    #[test]
    fn csv_has_one_row_per_file_and_escapes_paths() {
        let csv = CsvOutputAdapter::with_stdout().format_csv_string(&sample());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "1,0123456789abcdef0123,/photos/a.jpg,2048,6144,4096");
        assert!(lines[3].contains("\"/backup/a,copy.jpg\""));
    }

    #[test]
    fn tree_groups_by_directory() {
        let tree = TreeOutputAdapter::with_stdout().format_tree_output(&sample());
        assert!(tree.contains("|-- Hash: 0123456789abcdef\n"));
        assert!(tree.contains("|-- /backup/\n|   `-- a,copy.jpg\n"));
        assert!(tree.contains("`-- /photos/\n    |-- a.jpg\n    `-- b.jpg\n"));
    }

    #[test]
    fn summary_only_text_omits_paths() {
        let text = ConsoleOutputAdapter::new().with_summary_only(true).format_text(&sample());
        assert!(text.contains("Duplicate groups found: 1"));
        assert!(!text.contains("/photos/a.jpg"));
    }

    #[test]
    fn json_round_trips_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        JsonOutputAdapter::with_file(&path).write_results(&sample()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["total_files_scanned"], 10);
        assert_eq!(value["duplicates"][0]["files"].as_array().unwrap().len(), 3);
    }
}
