use dupescan::adapters::{FileSystemAdapter, MultiAlgorithmHasher, NoProgress};
use dupescan::services::DuplicateFinderService;
use dupescan::ScanConfig;
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_groups_are_byte_identical_and_same_size(
        contents in prop::collection::vec(prop::collection::vec(0u8..3, 1..6), 0..24)
    ) {
        let dir = TempDir::new().unwrap();
        for (i, content) in contents.iter().enumerate() {
            fs::write(dir.path().join(format!("f{:02}", i)), content).unwrap();
        }

        let config = ScanConfig::new().with_paths(vec![dir.path().to_path_buf()]);
        let finder = DuplicateFinderService::new(FileSystemAdapter::new(), MultiAlgorithmHasher::new(), NoProgress);
        let result = finder.find_duplicates(&config).unwrap();

        let mut grouped = 0;
        for set in &result.duplicates {
            prop_assert!(set.files.len() >= 2);
            let first = fs::read(&set.files[0].path).unwrap();
            for file in &set.files {
                prop_assert_eq!(file.size, first.len() as u64);
                prop_assert_eq!(fs::read(&file.path).unwrap(), first.clone());
            }
            grouped += set.files.len();
        }

        // every file sharing content with another one must be grouped
        let expected: usize = contents
            .iter()
            .filter(|c| contents.iter().filter(|o| o == c).count() > 1)
            .count();
        prop_assert_eq!(grouped, expected);
        prop_assert_eq!(result.total_files_scanned, contents.len());
    }
}
