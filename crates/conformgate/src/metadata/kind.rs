// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural kinds decoded from a metadata tag word.
//!
//! Every metadata record starts with a tag word. For non-reference types the
//! word holds a small kind value built from a low number and the
//! `NON_HEAP` / `RUNTIME_PRIVATE` / `NON_TYPE` flag bits. Older runtimes used
//! bare numbers for the same kinds, so both spellings are accepted. Anything
//! else (an isa pointer in practice) is a reference type.

use crate::config::{KIND_IS_NON_HEAP, KIND_IS_NON_TYPE, KIND_IS_RUNTIME_PRIVATE};
use std::fmt;

/// Coarse category of a runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralKind {
    /// Value record (struct). The only kind the fast path can disprove.
    ValueRecord,
    /// Variant record (enum).
    VariantRecord,
    /// Optional wrapper.
    Optional,
    /// Foreign reference type (imported class without runtime metadata).
    ForeignReference,
    /// Opaque builtin storage.
    Opaque,
    /// Tuple.
    Tuple,
    /// Function type.
    Function,
    /// Interface composition (existential).
    InterfaceComposition,
    /// Metatype.
    MetaHandle,
    /// Wrapper around a foreign class object.
    ReferenceWrapper,
    /// Metatype of an interface composition.
    InterfaceCompositionMeta,
    /// Heap-allocated local variable box.
    HeapLocalVariable,
    /// Heap-allocated generic local variable box.
    HeapGenericLocalVariable,
    /// Boxed error value.
    ErrorBox,
    /// Reference type (class). Catch-all for every unmapped tag word.
    ReferenceType,
}

impl StructuralKind {
    /// Every kind, catch-all last.
    pub const ALL: [StructuralKind; 15] = [
        StructuralKind::ValueRecord,
        StructuralKind::VariantRecord,
        StructuralKind::Optional,
        StructuralKind::ForeignReference,
        StructuralKind::Opaque,
        StructuralKind::Tuple,
        StructuralKind::Function,
        StructuralKind::InterfaceComposition,
        StructuralKind::MetaHandle,
        StructuralKind::ReferenceWrapper,
        StructuralKind::InterfaceCompositionMeta,
        StructuralKind::HeapLocalVariable,
        StructuralKind::HeapGenericLocalVariable,
        StructuralKind::ErrorBox,
        StructuralKind::ReferenceType,
    ];

    /// Classify a tag word. Total: unmapped words are [`StructuralKind::ReferenceType`].
    pub const fn from_tag_word(word: u64) -> Self {
        // Flagged spellings: 0x2xx = NON_HEAP, 0x3xx = NON_HEAP | RUNTIME_PRIVATE,
        // 0x4xx = NON_TYPE, 0x5xx = NON_TYPE | RUNTIME_PRIVATE.
        match word {
            1 | 0x200 => StructuralKind::ValueRecord,
            2 | 0x201 => StructuralKind::VariantRecord,
            3 | 0x202 => StructuralKind::Optional,
            16 | 0x203 => StructuralKind::ForeignReference,
            8 | 0x300 => StructuralKind::Opaque,
            9 | 0x301 => StructuralKind::Tuple,
            10 | 0x302 => StructuralKind::Function,
            12 | 0x303 => StructuralKind::InterfaceComposition,
            13 | 0x304 => StructuralKind::MetaHandle,
            14 | 0x305 => StructuralKind::ReferenceWrapper,
            15 | 0x306 => StructuralKind::InterfaceCompositionMeta,
            64 | 0x400 => StructuralKind::HeapLocalVariable,
            65 | 0x500 => StructuralKind::HeapGenericLocalVariable,
            128 | 0x501 => StructuralKind::ErrorBox,
            _ => StructuralKind::ReferenceType,
        }
    }

    /// Canonical (flagged) tag word for this kind.
    ///
    /// `ReferenceType` has no tag of its own; 0 is returned, which classifies
    /// back to the catch-all.
    pub const fn tag_word(self) -> u64 {
        const NH: u64 = KIND_IS_NON_HEAP;
        const RP: u64 = KIND_IS_RUNTIME_PRIVATE;
        const NT: u64 = KIND_IS_NON_TYPE;

        match self {
            StructuralKind::ValueRecord => NH,
            StructuralKind::VariantRecord => 1 | NH,
            StructuralKind::Optional => 2 | NH,
            StructuralKind::ForeignReference => 3 | NH,
            StructuralKind::Opaque => RP | NH,
            StructuralKind::Tuple => 1 | RP | NH,
            StructuralKind::Function => 2 | RP | NH,
            StructuralKind::InterfaceComposition => 3 | RP | NH,
            StructuralKind::MetaHandle => 4 | RP | NH,
            StructuralKind::ReferenceWrapper => 5 | RP | NH,
            StructuralKind::InterfaceCompositionMeta => 6 | RP | NH,
            StructuralKind::HeapLocalVariable => NT,
            StructuralKind::HeapGenericLocalVariable => NT | RP,
            StructuralKind::ErrorBox => 1 | NT | RP,
            StructuralKind::ReferenceType => 0,
        }
    }

    /// Legacy (unflagged) tag word, if the kind had one.
    pub const fn legacy_tag_word(self) -> Option<u64> {
        match self {
            StructuralKind::ValueRecord => Some(1),
            StructuralKind::VariantRecord => Some(2),
            StructuralKind::Optional => Some(3),
            StructuralKind::ForeignReference => Some(16),
            StructuralKind::Opaque => Some(8),
            StructuralKind::Tuple => Some(9),
            StructuralKind::Function => Some(10),
            StructuralKind::InterfaceComposition => Some(12),
            StructuralKind::MetaHandle => Some(13),
            StructuralKind::ReferenceWrapper => Some(14),
            StructuralKind::InterfaceCompositionMeta => Some(15),
            StructuralKind::HeapLocalVariable => Some(64),
            StructuralKind::HeapGenericLocalVariable => Some(65),
            StructuralKind::ErrorBox => Some(128),
            StructuralKind::ReferenceType => None,
        }
    }

    /// Short lowercase name used in logs and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            StructuralKind::ValueRecord => "value-record",
            StructuralKind::VariantRecord => "variant-record",
            StructuralKind::Optional => "optional",
            StructuralKind::ForeignReference => "foreign-reference",
            StructuralKind::Opaque => "opaque",
            StructuralKind::Tuple => "tuple",
            StructuralKind::Function => "function",
            StructuralKind::InterfaceComposition => "interface-composition",
            StructuralKind::MetaHandle => "meta-handle",
            StructuralKind::ReferenceWrapper => "reference-wrapper",
            StructuralKind::InterfaceCompositionMeta => "interface-composition-meta",
            StructuralKind::HeapLocalVariable => "heap-local-variable",
            StructuralKind::HeapGenericLocalVariable => "heap-generic-local-variable",
            StructuralKind::ErrorBox => "error-box",
            StructuralKind::ReferenceType => "reference-type",
        }
    }

    /// Returns true for the one kind whose descriptor the fast path can locate.
    pub const fn is_value_record(self) -> bool {
        matches!(self, StructuralKind::ValueRecord)
    }

    /// Returns true for kinds that live outside the heap (value semantics).
    pub const fn is_non_heap(self) -> bool {
        self.tag_word() & KIND_IS_NON_HEAP != 0
    }
}

impl fmt::Display for StructuralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_table_flagged() {
        let table: [(u64, StructuralKind); 14] = [
            (0x200, StructuralKind::ValueRecord),
            (0x201, StructuralKind::VariantRecord),
            (0x202, StructuralKind::Optional),
            (0x203, StructuralKind::ForeignReference),
            (0x300, StructuralKind::Opaque),
            (0x301, StructuralKind::Tuple),
            (0x302, StructuralKind::Function),
            (0x303, StructuralKind::InterfaceComposition),
            (0x304, StructuralKind::MetaHandle),
            (0x305, StructuralKind::ReferenceWrapper),
            (0x306, StructuralKind::InterfaceCompositionMeta),
            (0x400, StructuralKind::HeapLocalVariable),
            (0x500, StructuralKind::HeapGenericLocalVariable),
            (0x501, StructuralKind::ErrorBox),
        ];
        for (word, kind) in table {
            assert_eq!(StructuralKind::from_tag_word(word), kind, "word {:#x}", word);
        }
    }

    #[test]
    fn test_mapping_table_legacy() {
        let table: [(u64, StructuralKind); 14] = [
            (1, StructuralKind::ValueRecord),
            (2, StructuralKind::VariantRecord),
            (3, StructuralKind::Optional),
            (16, StructuralKind::ForeignReference),
            (8, StructuralKind::Opaque),
            (9, StructuralKind::Tuple),
            (10, StructuralKind::Function),
            (12, StructuralKind::InterfaceComposition),
            (13, StructuralKind::MetaHandle),
            (14, StructuralKind::ReferenceWrapper),
            (15, StructuralKind::InterfaceCompositionMeta),
            (64, StructuralKind::HeapLocalVariable),
            (65, StructuralKind::HeapGenericLocalVariable),
            (128, StructuralKind::ErrorBox),
        ];
        for (word, kind) in table {
            assert_eq!(StructuralKind::from_tag_word(word), kind, "word {}", word);
        }
    }

    #[test]
    fn test_unmapped_words_are_reference_types() {
        for word in [0u64, 4, 5, 11, 17, 0x204, 0x307, 0x401, 0x7FF, 0x1_0000_4000] {
            assert_eq!(
                StructuralKind::from_tag_word(word),
                StructuralKind::ReferenceType,
                "word {:#x}",
                word
            );
        }
    }

    #[test]
    fn test_tag_word_round_trips_for_every_kind() {
        for kind in StructuralKind::ALL {
            assert_eq!(StructuralKind::from_tag_word(kind.tag_word()), kind);
            if let Some(legacy) = kind.legacy_tag_word() {
                assert_eq!(StructuralKind::from_tag_word(legacy), kind);
            }
        }
    }

    #[test]
    fn test_totality_random_words() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        for _ in 0..10_000 {
            let word = u64::from(rng.u32(..));
            let kind = StructuralKind::from_tag_word(word);
            assert!(StructuralKind::ALL.contains(&kind));
            // Idempotent, no hidden state.
            assert_eq!(StructuralKind::from_tag_word(word), kind);
        }
    }

    #[test]
    fn test_predicates() {
        assert!(StructuralKind::ValueRecord.is_value_record());
        assert!(!StructuralKind::VariantRecord.is_value_record());
        assert!(StructuralKind::Tuple.is_non_heap());
        assert!(!StructuralKind::HeapLocalVariable.is_non_heap());
        assert!(!StructuralKind::ReferenceType.is_non_heap());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            StructuralKind::InterfaceComposition.to_string(),
            "interface-composition"
        );
    }
}
