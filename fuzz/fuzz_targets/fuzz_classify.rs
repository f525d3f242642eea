// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use conformgate::StructuralKind;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for chunk in data.chunks(8) {
        let mut word = [0u8; 8];
        word[..chunk.len()].copy_from_slice(chunk);
        let word = u64::from_ne_bytes(word);

        // Total: every word maps to a kind, and mapped kinds round-trip.
        let kind = StructuralKind::from_tag_word(word);
        if kind != StructuralKind::ReferenceType {
            assert!(word == kind.tag_word() || Some(word) == kind.legacy_tag_word());
            assert_eq!(StructuralKind::from_tag_word(kind.tag_word()), kind);
        }
    }
});
