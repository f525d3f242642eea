// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Interface identifiers and (diagnostic-only) descriptor decoding.

use super::layout;
use crate::error::{Error, Result};
use std::fmt;
use std::ptr::NonNull;

/// Address-sized value identifying one required interface.
///
/// The fast path only compares identifiers; it never dereferences them unless
/// [`InterfaceId::describe`] is called explicitly.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceId(u64);

impl InterfaceId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Decode the interface descriptor this identifier points at.
    ///
    /// # Errors
    ///
    /// [`Error::NullHandle`] for a zero identifier,
    /// [`Error::InvalidInterfaceName`] if the name is not UTF-8.
    ///
    /// # Safety
    ///
    /// The identifier must be the address of a live interface descriptor
    /// (see [`InterfaceDescriptorLayout`](super::layout::InterfaceDescriptorLayout))
    /// whose name string lives for the rest of the process.
    pub unsafe fn describe(self) -> Result<InterfaceInfo> {
        let base = NonNull::new(self.0 as usize as *mut u8).ok_or(Error::NullHandle)?;
        let (descriptor, name) = layout::read_interface_descriptor(base);
        Ok(InterfaceInfo {
            id: self,
            name: name.to_str()?,
            flags: descriptor.flags,
            requirement_count: descriptor.requirement_count,
        })
    }
}

impl fmt::Debug for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InterfaceId({:#x})", self.0)
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Decoded interface descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub id: InterfaceId,
    pub name: &'static str,
    pub flags: u32,
    pub requirement_count: u32,
}
