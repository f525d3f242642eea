// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed metadata record layouts and the raw reads into them.
//!
//! This is the only module that dereferences runtime-owned metadata. Every
//! other component works on the typed values these functions return.
//!
//! All records are 8-byte aligned and use native endianness. Offsets below are
//! for 64-bit targets:
//!
//! ```text
//! value record        +0 tag word  +8 descriptor
//! composition         +0 tag word  +8 flags (u32)  +12 interface count (u32)
//!                     +16 interface id[0]  +24 interface id[1] ...
//! interface descr.    +0 flags  +4 parent  +8 name (rel)  +12 reqs in sig
//!                     +16 requirement count  +20 associated type names (rel)
//! ```

use std::ffi::{c_char, CStr};
use std::mem::{align_of, offset_of, size_of};
use std::ptr::NonNull;

/// Width of a tag word and of an interface identifier.
pub const WORD_SIZE: usize = size_of::<u64>();

/// Size of the composition header; interface identifiers start right after it.
pub const COMPOSITION_HEADER_SIZE: usize = size_of::<CompositionLayout>();

#[repr(C)]
#[derive(Debug, Clone, Copy)]
/// Leading words of a value-record metadata record.
pub struct ValueRecordLayout {
    pub kind: u64,
    pub descriptor: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
/// Header of an interface-composition metadata record.
pub struct CompositionLayout {
    pub kind: u64,
    pub flags: u32,
    pub interface_count: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
/// Interface descriptor. `name` and `associated_type_names` are offsets
/// relative to their own field address.
pub struct InterfaceDescriptorLayout {
    pub flags: u32,
    pub parent: i32,
    pub name: i32,
    pub requirements_in_signature: u32,
    pub requirement_count: u32,
    pub associated_type_names: i32,
}

/// Byte offset of the relative name pointer inside an interface descriptor.
pub const INTERFACE_NAME_OFFSET: usize = offset_of!(InterfaceDescriptorLayout, name);

#[inline]
fn is_word_aligned(ptr: *const u8) -> bool {
    ptr.align_offset(align_of::<u64>()) == 0
}

/// Read the tag word of any metadata record.
///
/// # Safety
///
/// `base` must point to a live, 8-byte aligned metadata record.
#[inline]
pub(crate) unsafe fn read_tag_word(base: NonNull<u8>) -> u64 {
    read_word(base, 0)
}

/// Read one word at `offset` bytes from `base`.
///
/// # Safety
///
/// `base + offset .. base + offset + 8` must lie inside a live metadata record
/// and `base + offset` must be 8-byte aligned.
#[inline]
pub(crate) unsafe fn read_word(base: NonNull<u8>, offset: usize) -> u64 {
    let ptr = base.as_ptr().add(offset);
    debug_assert!(is_word_aligned(ptr), "unaligned metadata word at {:p}", ptr);
    ptr.cast::<u64>().read()
}

/// Read the leading words of a value record.
///
/// # Safety
///
/// `base` must point to a live metadata record that classifies as a value record.
#[inline]
pub(crate) unsafe fn read_value_record(base: NonNull<u8>) -> ValueRecordLayout {
    debug_assert!(is_word_aligned(base.as_ptr()));
    base.cast::<ValueRecordLayout>().as_ptr().read()
}

/// Read a composition header.
///
/// # Safety
///
/// `base` must point to a live metadata record that classifies as an interface
/// composition.
#[inline]
pub(crate) unsafe fn read_composition_header(base: NonNull<u8>) -> CompositionLayout {
    debug_assert!(is_word_aligned(base.as_ptr()));
    base.cast::<CompositionLayout>().as_ptr().read()
}

/// Read an interface descriptor and resolve its name.
///
/// # Safety
///
/// `base` must point to a live interface descriptor whose relative name offset
/// targets a NUL-terminated string that stays alive for the rest of the process.
pub(crate) unsafe fn read_interface_descriptor(
    base: NonNull<u8>,
) -> (InterfaceDescriptorLayout, &'static CStr) {
    let layout = base.cast::<InterfaceDescriptorLayout>().as_ptr().read_unaligned();
    let field = base.as_ptr().add(INTERFACE_NAME_OFFSET);
    let name = field.offset(layout.name as isize).cast::<c_char>();
    (layout, CStr::from_ptr(name))
}
