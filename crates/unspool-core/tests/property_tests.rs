//! Property-based tests for path safety and limits.
//!
//! These tests use proptest to generate arbitrary inputs and verify
//! security properties hold across a wide range of cases.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Cursor;
use std::path::Path;

use proptest::prelude::*;
use tempfile::TempDir;
use unspool_core::CancelToken;
use unspool_core::ExpandError;
use unspool_core::ExpandLimits;
use unspool_core::ExpandOptions;
use unspool_core::copy::CopyBuffer;
use unspool_core::copy::copy_with_buffer;
use unspool_core::extraction::extract_tar;
use unspool_core::security::QuotaTracker;
use unspool_core::security::contains_parent_traversal;
use unspool_core::security::validate_entry_name;
use unspool_core::test_utils::TarTestBuilder;

proptest! {
    /// Any name with a `..` component is rejected.
    #[test]
    fn prop_parent_traversal_rejected(
        prefix in "([a-z]+/){0,5}",
        suffix in "([a-z]+/?){0,5}"
    ) {
        let name = format!("{prefix}../{suffix}");
        prop_assert!(contains_parent_traversal(Path::new(&name)));
        let rejected = matches!(
            validate_entry_name(Path::new(&name)),
            Err(ExpandError::PathEscape { .. })
        );
        prop_assert!(rejected);
    }

    /// Plain relative names are accepted unchanged.
    #[test]
    fn prop_valid_relative_paths_accepted(
        components in prop::collection::vec("[a-zA-Z0-9_-]{1,20}", 1..5)
    ) {
        let name = components.join("/");
        let normalized = validate_entry_name(Path::new(&name)).unwrap();
        prop_assert_eq!(normalized, Path::new(&name));
    }

    /// Traversal entries never produce a file outside the destination.
    #[test]
    fn prop_traversal_entry_writes_nothing_outside(depth in 1usize..5, name in "[a-z]{1,8}") {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("out");
        let entry = format!("{}{name}", "../".repeat(depth));
        let data = TarTestBuilder::new().add_raw_entry(&entry, b"evil").build();

        let result = extract_tar(
            &data[..],
            &dest,
            ExpandLimits::default(),
            &ExpandOptions::directory(),
        );
        let rejected = matches!(result, Err(ExpandError::PathEscape { .. }));
        prop_assert!(rejected);
        prop_assert!(!temp.path().join(&name).exists());
    }

    /// The entry limit fails exactly at the entry that crosses it.
    #[test]
    fn prop_entry_limit_exact(limit in 1usize..20, count in 1usize..30) {
        let mut tracker = QuotaTracker::new(ExpandLimits::default().with_files_limit(limit));
        let mut failed_at = None;
        for i in 1..=count {
            if tracker.record_entry().is_err() {
                failed_at = Some(i);
                break;
            }
        }
        if count > limit {
            prop_assert_eq!(failed_at, Some(limit + 1));
        } else {
            prop_assert_eq!(failed_at, None);
        }
    }

    /// The copy ceiling never lets more than the limit reach the writer.
    #[test]
    fn prop_copy_ceiling_respected(len in 0usize..200_000, limit in 0u64..200_000) {
        let data = vec![0x5A_u8; len];
        let mut output = Vec::new();
        let mut buffer = CopyBuffer::new();
        let result = copy_with_buffer(
            &mut Cursor::new(&data),
            &mut output,
            &mut buffer,
            Some(limit),
            &CancelToken::new(),
            Path::new("memory"),
        );

        prop_assert!(output.len() as u64 <= limit);
        if len as u64 <= limit {
            prop_assert_eq!(result.unwrap(), len as u64);
        } else {
            let exceeded = matches!(result, Err(ExpandError::SizeLimitExceeded { .. }));
            prop_assert!(exceeded);
        }
    }
}
