// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use proptest::prelude::*;

use super::buffer_with;

fn content() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 1..256)
}

proptest! {
    #[test]
    fn negative_index_mirrors_positive(bytes in content(), back in 1..=256usize) {
        let buffer = buffer_with(&bytes);
        let back = back.min(bytes.len());

        let from_end = buffer.get(-(back as isize)).expect("Failed to get(..)");
        let from_start = buffer
            .get((bytes.len() - back) as isize)
            .expect("Failed to get(..)");

        prop_assert_eq!(from_end, from_start);
        prop_assert_eq!(from_end, bytes[bytes.len() - back]);
    }

    #[test]
    fn replace_range_matches_vec_splice(
        bytes in content(),
        a in 0..256usize,
        b in 0..256usize,
        replacement in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut buffer = buffer_with(&bytes);
        let start = a.min(bytes.len());
        let end = b.min(bytes.len()).max(start);

        buffer
            .replace_range(start as isize..end as isize, &replacement)
            .expect("Failed to replace_range(..)");

        let mut model = bytes.clone();
        model.splice(start..end, replacement.iter().copied());

        prop_assert_eq!(buffer.len(), bytes.len() - (end - start) + replacement.len());
        prop_assert_eq!(
            buffer
                .slice(start as isize, replacement.len() as isize)
                .expect("Failed to slice(..)"),
            replacement.clone()
        );
        prop_assert_eq!(buffer.to_vec().expect("Failed to to_vec()"), model);
    }

    #[test]
    fn insert_then_delete_restores_content(
        bytes in content(),
        at in 0..=256usize,
        inserted in proptest::collection::vec(any::<u8>(), 1..64),
    ) {
        let mut buffer = buffer_with(&bytes);
        let at = at.min(bytes.len());

        buffer.insert(at as isize, &inserted).expect("Failed to insert(..)");
        let removed = buffer
            .delete_slice(at as isize, inserted.len() as isize)
            .expect("Failed to delete_slice(..)");

        prop_assert_eq!(removed, inserted);
        prop_assert_eq!(buffer.to_vec().expect("Failed to to_vec()"), bytes);
    }

    #[test]
    fn ordering_agrees_with_slices(left in content(), right in content()) {
        let left_buffer = buffer_with(&left);
        let right_buffer = buffer_with(&right);
        let expected = left.cmp(&right);

        prop_assert_eq!(left_buffer.try_cmp(&right).expect("Failed to try_cmp(..)"), expected);
        prop_assert_eq!(left_buffer.partial_cmp(&right_buffer), Some(expected));
        prop_assert_eq!(right_buffer.partial_cmp(&left_buffer), Some(expected.reverse()));
        prop_assert_eq!(left_buffer == right_buffer, left == right);
    }

    #[test]
    fn literal_substitution_matches_model(
        bytes in proptest::collection::vec(prop_oneof![Just(b'a'), Just(b'b'), Just(b'c')], 0..128),
        replacement in proptest::collection::vec(any::<u8>(), 0..4),
    ) {
        let mut buffer = buffer_with(&bytes);

        let result = buffer
            .substitute_all("ab", replacement.as_slice())
            .expect("Failed to substitute_all(..)");

        let mut model = Vec::new();
        let mut count = 0;
        let mut rest = bytes.as_slice();
        while !rest.is_empty() {
            if rest.starts_with(b"ab") {
                model.extend_from_slice(&replacement);
                rest = &rest[2..];
                count += 1;
            } else {
                model.push(rest[0]);
                rest = &rest[1..];
            }
        }

        prop_assert_eq!(result.count, count);
        prop_assert_eq!(buffer.to_vec().expect("Failed to to_vec()"), model);
    }
}
