//! Property-based tests for naming, encoding and batching.

use proptest::prelude::*;
use tonuino_cards::models::check_consecutive;
use tonuino_cards::services::{decimal_to_hex, hex_to_int, pack, sanitize_filename};

proptest! {
    /// Sanitizing twice changes nothing.
    #[test]
    fn sanitize_is_idempotent(name in "\\PC{0,40}") {
        let once = sanitize_filename(&name);
        prop_assert_eq!(sanitize_filename(&once), once);
    }

    /// A run of n spaces becomes exactly n underscores.
    #[test]
    fn sanitize_keeps_space_runs(left in "[a-zA-Z0-9]{1,8}", right in "[a-zA-Z0-9]{1,8}", n in 1usize..10) {
        let name = format!("{left}{}{right}", " ".repeat(n));
        prop_assert_eq!(sanitize_filename(&name), format!("{left}{}{right}", "_".repeat(n)));
    }

    /// Every byte value is two hex digits and parses back.
    #[test]
    fn hex_round_trip(n in 0u32..=255) {
        let hex = decimal_to_hex(n);
        prop_assert_eq!(hex.len(), 2);
        prop_assert_eq!(hex_to_int(&hex), Some(n));
    }

    /// Batches cover the input in order, ceil(n / k) of them.
    #[test]
    fn pack_preserves_payloads(payloads in prop::collection::vec("[0-9a-f]{18};Card no\\. [0-9]{1,2}", 0..60), k in 1usize..10) {
        let batches = pack(&payloads, k).unwrap();

        prop_assert_eq!(batches.len(), payloads.len().div_ceil(k));
        prop_assert!(batches.iter().all(|b| !b.payloads.is_empty() && b.payloads.len() <= k));

        let joined: Vec<String> = batches.into_iter().flat_map(|b| b.payloads).collect();
        prop_assert_eq!(joined, payloads);
    }

    /// 1..=n in any order is accepted.
    #[test]
    fn consecutive_numbers_accepted(numbers in (1u32..=99).prop_flat_map(|n| Just((1..=n).collect::<Vec<u32>>()).prop_shuffle())) {
        prop_assert!(check_consecutive(&numbers).is_ok());
    }

    /// Dropping any number but the last leaves a gap.
    #[test]
    fn gap_rejected((n, gap) in (2u32..=99).prop_flat_map(|n| (Just(n), 1..n))) {
        let numbers: Vec<u32> = (1..=n).filter(|&i| i != gap).collect();
        prop_assert!(check_consecutive(&numbers).is_err());
    }

    /// A repeated number is rejected even if the run is otherwise complete.
    #[test]
    fn duplicate_rejected((n, dup) in (1u32..=98).prop_flat_map(|n| (Just(n), 1..=n))) {
        let mut numbers: Vec<u32> = (1..=n).collect();
        numbers.push(dup);
        prop_assert!(check_consecutive(&numbers).is_err());
    }
}
