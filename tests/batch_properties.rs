// tests/batch_properties.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use proptest::prelude::*;
use watchloop::types::{ChangeRecord, FileStatus};
use watchloop::watch::Batch;

fn status_strategy() -> impl Strategy<Value = FileStatus> {
    prop_oneof![
        Just(FileStatus::Added),
        Just(FileStatus::Changed),
        Just(FileStatus::Renamed),
        Just(FileStatus::Deleted),
    ]
}

// A few paths so the same path is recorded many times per sequence.
fn record_strategy() -> impl Strategy<Value = ChangeRecord> {
    (0..4usize, status_strategy())
        .prop_map(|(i, status)| ChangeRecord::new(PathBuf::from(format!("/p/f{i}")), status))
}

proptest! {
    #[test]
    fn one_record_per_path_with_last_write_semantics(
        records in proptest::collection::vec(record_strategy(), 0..40)
    ) {
        let mut batch = Batch::new();
        let mut model: BTreeMap<PathBuf, FileStatus> = BTreeMap::new();

        for record in records {
            let expected = match (model.get(&record.path), record.status) {
                (Some(FileStatus::Deleted), FileStatus::Added) => FileStatus::Changed,
                (_, status) => status,
            };
            model.insert(record.path.clone(), expected);
            batch.record(record);
        }

        let taken = batch.take();
        let paths: Vec<PathBuf> = taken.iter().map(|r| r.path.clone()).collect();
        let mut deduped = paths.clone();
        deduped.dedup();
        prop_assert_eq!(&paths, &deduped, "a path appears at most once");

        let got: BTreeMap<PathBuf, FileStatus> =
            taken.into_iter().map(|r| (r.path, r.status)).collect();
        prop_assert_eq!(got, model);
        prop_assert!(batch.is_empty());
    }

    #[test]
    fn delete_then_add_never_survives_as_added(
        prefix in proptest::collection::vec(status_strategy(), 0..5)
    ) {
        let path = PathBuf::from("/p/x");
        let mut batch = Batch::new();
        for status in prefix {
            batch.record(ChangeRecord::new(path.clone(), status));
        }
        batch.record(ChangeRecord::new(path.clone(), FileStatus::Deleted));
        batch.record(ChangeRecord::new(path.clone(), FileStatus::Added));

        prop_assert_eq!(batch.status_of(&path), Some(FileStatus::Changed));
    }
}
