// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Interface-composition parser.
//!
//! A composition record is a fixed header (tag word, flags, interface count)
//! followed by `interface_count` interface identifiers, one word each.
//! [`CompositionHandle`] is the validated form; [`parse_composition`] is the
//! raw entry point and treats a misclassified handle as a fatal contract
//! violation, because reading any other layout as a composition would walk
//! arbitrary memory.

use super::handle::TypeHandle;
use super::interface::InterfaceId;
use super::kind::StructuralKind;
use super::layout::{self, COMPOSITION_HEADER_SIZE, WORD_SIZE};
use crate::config::{
    COMPOSITION_CLASS_CONSTRAINT_ANY, COMPOSITION_HAS_SUPERCLASS,
    COMPOSITION_SPECIAL_INTERFACE_MASK, COMPOSITION_SPECIAL_INTERFACE_SHIFT,
    COMPOSITION_WITNESS_TABLE_MASK,
};
use crate::error::{Error, Result};
use std::fmt;
use std::iter::FusedIterator;
use std::ptr::NonNull;

/// Flags word of a composition header.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompositionFlags(u32);

impl CompositionFlags {
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Composition only admits reference types (class-constrained).
    pub const fn is_reference_bound(self) -> bool {
        self.0 & COMPOSITION_CLASS_CONSTRAINT_ANY == 0
    }

    pub const fn has_superclass_constraint(self) -> bool {
        self.0 & COMPOSITION_HAS_SUPERCLASS != 0
    }

    pub const fn special_interface(self) -> SpecialInterface {
        match (self.0 & COMPOSITION_SPECIAL_INTERFACE_MASK) >> COMPOSITION_SPECIAL_INTERFACE_SHIFT {
            0 => SpecialInterface::None,
            1 => SpecialInterface::Error,
            // Field is 6 bits wide after the shift.
            other => SpecialInterface::Other(other as u8),
        }
    }

    pub const fn witness_table_count(self) -> u32 {
        self.0 & COMPOSITION_WITNESS_TABLE_MASK
    }
}

impl fmt::Debug for CompositionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositionFlags")
            .field("bits", &format_args!("{:#010x}", self.0))
            .field("reference_bound", &self.is_reference_bound())
            .field("superclass", &self.has_superclass_constraint())
            .field("special", &self.special_interface())
            .field("witness_tables", &self.witness_table_count())
            .finish()
    }
}

/// Special interface a composition is known to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialInterface {
    None,
    /// The language's error interface.
    Error,
    Other(u8),
}

/// Decoded composition header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositionHeader {
    pub flags: CompositionFlags,
    pub interface_count: u32,
}

impl CompositionHeader {
    pub const fn is_reference_bound(&self) -> bool {
        self.flags.is_reference_bound()
    }
}

/// Handle already known to classify as [`StructuralKind::InterfaceComposition`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompositionHandle(TypeHandle);

impl CompositionHandle {
    /// Validate that `handle` is an interface composition.
    ///
    /// # Errors
    ///
    /// [`Error::NotAComposition`] carrying the kind the handle classified as.
    pub fn new(handle: TypeHandle) -> Result<Self> {
        match handle.kind() {
            StructuralKind::InterfaceComposition => Ok(Self(handle)),
            found => Err(Error::NotAComposition { found }),
        }
    }

    pub fn handle(self) -> TypeHandle {
        self.0
    }

    /// Read the header only.
    pub fn header(self) -> CompositionHeader {
        // SAFETY: live record (TypeHandle contract) classified as a composition.
        let raw = unsafe { layout::read_composition_header(self.0.as_non_null()) };
        CompositionHeader {
            flags: CompositionFlags::from_bits(raw.flags),
            interface_count: raw.interface_count,
        }
    }

    /// Read the header and return a one-shot iterator over the interfaces.
    pub fn parse(self) -> ParsedComposition {
        let header = self.header();
        ParsedComposition {
            header,
            interfaces: InterfaceIter {
                base: self.0.as_non_null(),
                cursor: COMPOSITION_HEADER_SIZE,
                remaining: header.interface_count,
            },
        }
    }
}

impl TryFrom<TypeHandle> for CompositionHandle {
    type Error = Error;

    fn try_from(handle: TypeHandle) -> Result<Self> {
        Self::new(handle)
    }
}

impl fmt::Debug for CompositionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositionHandle({:#x})", self.0.address())
    }
}

/// Result of [`CompositionHandle::parse`].
#[derive(Debug)]
pub struct ParsedComposition {
    pub header: CompositionHeader,
    pub interfaces: InterfaceIter,
}

/// Lazy reader over a composition's trailing interface identifiers.
///
/// Yields exactly `interface_count` items, reading one word per step. Not
/// `Clone`: a cursor is never replayed.
#[derive(Debug)]
pub struct InterfaceIter {
    base: NonNull<u8>,
    cursor: usize,
    remaining: u32,
}

impl Iterator for InterfaceIter {
    type Item = InterfaceId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        // SAFETY: cursor stays within header + interface_count words of a live
        // composition record.
        let raw = unsafe { layout::read_word(self.base, self.cursor) };
        self.cursor += WORD_SIZE;
        self.remaining -= 1;
        Some(InterfaceId::from_raw(raw))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for InterfaceIter {}

impl FusedIterator for InterfaceIter {}

/// Parse a composition from a raw handle.
///
/// # Panics
///
/// Panics if `handle` does not classify as an interface composition. This is
/// a caller contract violation, not a recoverable condition.
pub fn parse_composition(handle: TypeHandle) -> ParsedComposition {
    expect_composition(handle).parse()
}

pub(crate) fn expect_composition(handle: TypeHandle) -> CompositionHandle {
    match CompositionHandle::new(handle) {
        Ok(composition) => composition,
        Err(err) => {
            log::error!("[composition] contract violation on {}: {}", handle, err);
            panic!("contract violation: {} ({})", err, handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::synth::SyntheticRuntime;

    #[test]
    fn test_parse_two_interfaces() {
        let mut runtime = SyntheticRuntime::new();
        let composition = runtime.composition(&[
            InterfaceId::from_raw(0x111),
            InterfaceId::from_raw(0x222),
        ]);

        let parsed = parse_composition(composition);
        assert_eq!(parsed.header.interface_count, 2);
        assert!(!parsed.header.is_reference_bound());
        assert_eq!(parsed.interfaces.len(), 2);

        let ids: Vec<_> = parsed.interfaces.collect();
        assert_eq!(
            ids,
            vec![InterfaceId::from_raw(0x111), InterfaceId::from_raw(0x222)]
        );
    }

    #[test]
    fn test_iterator_is_fused() {
        let mut runtime = SyntheticRuntime::new();
        let composition = runtime.composition(&[InterfaceId::from_raw(0x1)]);
        let mut interfaces = parse_composition(composition).interfaces;
        assert_eq!(interfaces.next(), Some(InterfaceId::from_raw(0x1)));
        assert_eq!(interfaces.next(), None);
        assert_eq!(interfaces.next(), None);
        assert_eq!(interfaces.len(), 0);
    }

    #[test]
    fn test_empty_composition() {
        let mut runtime = SyntheticRuntime::new();
        let composition = runtime.composition(&[]);
        let parsed = parse_composition(composition);
        assert_eq!(parsed.header.interface_count, 0);
        assert_eq!(parsed.interfaces.count(), 0);
    }

    #[test]
    fn test_reference_bound_flag() {
        let mut runtime = SyntheticRuntime::new();
        let composition =
            runtime.reference_bound_composition(&[InterfaceId::from_raw(0x111)]);
        let header = CompositionHandle::new(composition).unwrap().header();
        assert!(header.is_reference_bound());
        assert_eq!(header.interface_count, 1);
    }

    #[test]
    fn test_flags_decoding() {
        let flags = CompositionFlags::from_bits(0x8000_0000 | 0x0100_0000 | 3);
        assert!(!flags.is_reference_bound());
        assert!(!flags.has_superclass_constraint());
        assert_eq!(flags.special_interface(), SpecialInterface::Error);
        assert_eq!(flags.witness_table_count(), 3);

        let class_bound = CompositionFlags::from_bits(0x4000_0000);
        assert!(class_bound.is_reference_bound());
        assert!(class_bound.has_superclass_constraint());
        assert_eq!(class_bound.special_interface(), SpecialInterface::None);
    }

    #[test]
    fn test_checked_conversion_rejects_value_record() {
        let mut runtime = SyntheticRuntime::new();
        let ty = runtime.value_record();
        let err = CompositionHandle::try_from(ty).unwrap_err();
        assert!(matches!(
            err,
            Error::NotAComposition {
                found: StructuralKind::ValueRecord
            }
        ));
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn test_parse_non_composition_panics() {
        let mut runtime = SyntheticRuntime::new();
        let ty = runtime.record_of_kind(StructuralKind::Tuple);
        let _ = parse_composition(ty);
    }
}
