//! Property-based tests for overlay registration.
//!
//! These tests use proptest to generate registration sequences and verify
//! that the overlay never holds two projects at the same path and that
//! re-registering leaves the file untouched.

#[cfg(test)]
mod proptest_tests {
    use std::collections::HashSet;
    use std::fs;

    use proptest::prelude::*;
    use tempfile::TempDir;

    use crate::config::Config;
    use crate::manifest::ManifestDocument;
    use crate::overlay::LocalOverlayWriter;

    fn writer(temp: &TempDir) -> LocalOverlayWriter {
        let config = Config {
            tree_root: temp.path().to_path_buf(),
            ..Config::default()
        };
        LocalOverlayWriter::for_device(&config, "foo")
    }

    fn registration() -> impl Strategy<Value = (String, String, String)> {
        (
            "[a-z]{1,3}",
            "(device|vendor|kernel)/[a-c]{1,2}",
            "(thirteen|fourteen|main)",
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Property: no sequence of registrations writes a path twice
        #[test]
        fn registrations_never_duplicate_paths(calls in prop::collection::vec(registration(), 1..12)) {
            let temp = TempDir::new().unwrap();
            let writer = writer(&temp);
            for (repository, path, revision) in &calls {
                writer.register(repository, path, revision).unwrap();
            }

            let paths: Vec<String> = writer.load().projects().map(|p| p.path).collect();
            let unique: HashSet<&String> = paths.iter().collect();
            prop_assert_eq!(unique.len(), paths.len());

            let expected: HashSet<&String> = calls.iter().map(|(_, path, _)| path).collect();
            prop_assert_eq!(unique, expected);
        }

        /// Property: registering the same entry twice leaves identical bytes
        #[test]
        fn registration_is_idempotent((repository, path, revision) in registration()) {
            let temp = TempDir::new().unwrap();
            let writer = writer(&temp);
            writer.register(&repository, &path, &revision).unwrap();
            let first = fs::read(writer.path()).unwrap();
            writer.register(&repository, &path, &revision).unwrap();
            prop_assert_eq!(fs::read(writer.path()).unwrap(), first);
        }

        /// Property: a written overlay re-serializes byte for byte
        #[test]
        fn written_overlay_roundtrips(calls in prop::collection::vec(registration(), 1..8)) {
            let temp = TempDir::new().unwrap();
            let writer = writer(&temp);
            for (repository, path, revision) in &calls {
                writer.register(repository, path, revision).unwrap();
            }
            let on_disk = fs::read_to_string(writer.path()).unwrap();
            let reparsed = ManifestDocument::parse(&on_disk, writer.path()).unwrap();
            prop_assert_eq!(reparsed.to_xml_string().unwrap(), on_disk);
        }
    }
}
