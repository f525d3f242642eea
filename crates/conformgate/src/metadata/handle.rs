// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Opaque type handles and the value-record descriptor locator.

use super::kind::StructuralKind;
use super::layout;
use crate::error::{Error, Result};
use std::ffi::c_void;
use std::fmt;
use std::ptr::NonNull;

/// Read-only view of a runtime type metadata record.
///
/// A handle never owns the record. Creating one is `unsafe` because every
/// later read trusts the pointer; after that, classification and descriptor
/// lookup are safe, side-effect-free reads.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeHandle(NonNull<u8>);

// SAFETY: a TypeHandle only ever reads immutable, process-lifetime metadata
// (see `TypeHandle::from_ptr`), so sharing it across threads is sound.
unsafe impl Send for TypeHandle {}
// SAFETY: see `Send` above.
unsafe impl Sync for TypeHandle {}

impl TypeHandle {
    /// Wrap a metadata pointer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NullHandle`] for a null pointer.
    ///
    /// # Safety
    ///
    /// `ptr` must point to an 8-byte aligned metadata record that stays alive
    /// and unmodified for as long as the handle (or any copy of it) is used.
    /// The record must be at least as large as the layout its tag word implies
    /// (see [`layout`](crate::metadata::layout)).
    pub unsafe fn from_ptr(ptr: *const c_void) -> Result<Self> {
        NonNull::new(ptr.cast_mut().cast::<u8>())
            .map(Self)
            .ok_or(Error::NullHandle)
    }

    pub(crate) fn from_non_null(ptr: NonNull<u8>) -> Self {
        Self(ptr)
    }

    pub(crate) fn as_non_null(self) -> NonNull<u8> {
        self.0
    }

    /// Raw pointer to the record.
    pub fn as_ptr(self) -> *const c_void {
        self.0.as_ptr().cast_const().cast()
    }

    /// Record address, as used for logging and deduplication.
    pub fn address(self) -> u64 {
        self.0.as_ptr() as usize as u64
    }

    /// Leading tag word of the record.
    #[inline]
    pub fn tag_word(self) -> u64 {
        // SAFETY: the handle's construction contract guarantees a live record.
        unsafe { layout::read_tag_word(self.0) }
    }

    /// Structural kind of the record. Pure and idempotent.
    #[inline]
    pub fn kind(self) -> StructuralKind {
        StructuralKind::from_tag_word(self.tag_word())
    }

    /// Registry key for value records, `None` for every other kind.
    ///
    /// Only the value-record layout is relied upon here; other kinds carry a
    /// descriptor too, but at offsets that have not been validated.
    pub fn descriptor(self) -> Option<TypeDescriptor> {
        if !self.kind().is_value_record() {
            return None;
        }
        // SAFETY: live record (construction contract) classified as a value record.
        let record = unsafe { layout::read_value_record(self.0) };
        Some(TypeDescriptor(record.descriptor))
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle({:#x})", self.address())
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.address())
    }
}

/// Registry key of a value-record type (its nominal descriptor address).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeDescriptor(u64);

impl TypeDescriptor {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({:#x})", self.0)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(record: &'static [u64]) -> TypeHandle {
        unsafe { TypeHandle::from_ptr(record.as_ptr().cast()) }.expect("non-null")
    }

    #[test]
    fn test_null_is_rejected() {
        let result = unsafe { TypeHandle::from_ptr(std::ptr::null()) };
        assert!(matches!(result, Err(Error::NullHandle)));
    }

    #[test]
    fn test_value_record_descriptor() {
        static RECORD: [u64; 2] = [0x200, 0xABC];
        let ty = handle(&RECORD);
        assert_eq!(ty.kind(), StructuralKind::ValueRecord);
        assert_eq!(ty.descriptor(), Some(TypeDescriptor::from_raw(0xABC)));
    }

    #[test]
    fn test_legacy_value_record_descriptor() {
        static RECORD: [u64; 2] = [1, 0x1234];
        assert_eq!(
            handle(&RECORD).descriptor(),
            Some(TypeDescriptor::from_raw(0x1234))
        );
    }

    #[test]
    fn test_other_kinds_have_no_descriptor() {
        static VARIANT: [u64; 2] = [0x201, 0xABC];
        static TUPLE: [u64; 2] = [0x301, 0xABC];
        static CLASS: [u64; 2] = [0x1_0000_8000, 0xABC];
        assert_eq!(handle(&VARIANT).descriptor(), None);
        assert_eq!(handle(&TUPLE).descriptor(), None);
        assert_eq!(handle(&CLASS).kind(), StructuralKind::ReferenceType);
        assert_eq!(handle(&CLASS).descriptor(), None);
    }

    #[test]
    fn test_debug_format() {
        let descriptor = TypeDescriptor::from_raw(0xABC);
        assert_eq!(format!("{:?}", descriptor), "TypeDescriptor(0xabc)");
        assert_eq!(descriptor.to_string(), "0xabc");
    }
}
