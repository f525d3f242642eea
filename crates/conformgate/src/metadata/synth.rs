// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Synthetic metadata image.
//!
//! Builds metadata records in exactly the layouts described in
//! [`layout`](super::layout), so tests, benches, fuzz targets and the probe
//! tool exercise the same raw reads a real runtime image would. Records are
//! leaked: like runtime metadata they live for the rest of the
//! process, which is what makes the handles returned here valid.
//!
//! The runtime also remembers declared conformances. It feeds them to a
//! [`ConformanceTable`](crate::registry::ConformanceTable) through
//! [`ConformanceSource`] and offers [`SyntheticRuntime::authoritative_conforms`],
//! a slow linear scan standing in for the runtime's own check.

use super::composition::CompositionHandle;
use super::handle::{TypeDescriptor, TypeHandle};
use super::interface::InterfaceId;
use super::kind::StructuralKind;
use super::layout::{InterfaceDescriptorLayout, INTERFACE_NAME_OFFSET, WORD_SIZE};
use crate::config::COMPOSITION_CLASS_CONSTRAINT_ANY;
use crate::registry::{ConformanceRecord, ConformanceSource};
use std::mem::size_of;
use std::ptr::NonNull;

/// Builder and conformance oracle over leaked metadata records.
///
/// # Memory
///
/// Every constructor (`value_record`, `record_of_kind`, `interface`,
/// `composition` and friends) leaks its record with `Box::leak`. Nothing is
/// freed when the runtime is dropped, since handles to the records may still
/// be in use. Build a fixed image up front; do not create records inside a
/// loop that runs for the life of a process. [`leaked_bytes`](Self::leaked_bytes)
/// reports the total so far.
#[derive(Debug, Default)]
pub struct SyntheticRuntime {
    conformances: Vec<(TypeHandle, InterfaceId)>,
    records: usize,
    leaked_bytes: usize,
}

impl SyntheticRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of metadata records created so far (interfaces included).
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Bytes leaked by this runtime, descriptors and name strings included.
    pub fn leaked_bytes(&self) -> usize {
        self.leaked_bytes
    }

    /// Value record with a freshly allocated nominal descriptor.
    pub fn value_record(&mut self) -> TypeHandle {
        // The descriptor is the address of a leaked placeholder word, so every
        // call yields a distinct, stable key.
        let descriptor = self.leak(vec![0]).as_ptr() as usize as u64;
        self.value_record_with_descriptor(TypeDescriptor::from_raw(descriptor))
    }

    /// Value record carrying a caller-chosen descriptor.
    pub fn value_record_with_descriptor(&mut self, descriptor: TypeDescriptor) -> TypeHandle {
        self.record(vec![StructuralKind::ValueRecord.tag_word(), descriptor.raw()])
    }

    /// Record of any kind.
    ///
    /// `ValueRecord` gets a fresh descriptor, `InterfaceComposition` an empty
    /// interface list, `ReferenceType` an isa-like pointer as its tag word.
    pub fn record_of_kind(&mut self, kind: StructuralKind) -> TypeHandle {
        match kind {
            StructuralKind::ValueRecord => self.value_record(),
            StructuralKind::InterfaceComposition => self.composition(&[]),
            StructuralKind::ReferenceType => {
                let isa = self.leak(vec![0, 0]).as_ptr() as usize as u64;
                self.record(vec![isa, 0])
            }
            other => self.record(vec![other.tag_word(), 0]),
        }
    }

    /// Interface descriptor named `name`. The returned identifier is the
    /// descriptor's address, so [`InterfaceId::describe`] can decode it.
    pub fn interface(&mut self, name: &str) -> InterfaceId {
        let header_size = size_of::<InterfaceDescriptorLayout>();
        let name_bytes: Vec<u8> = name.bytes().take_while(|b| *b != 0).collect();

        let mut bytes = vec![0u8; header_size];
        // flags, parent: zero. name: relative to the name field.
        let name_offset = (header_size - INTERFACE_NAME_OFFSET) as i32;
        bytes[INTERFACE_NAME_OFFSET..INTERFACE_NAME_OFFSET + 4]
            .copy_from_slice(&name_offset.to_ne_bytes());
        bytes.extend_from_slice(&name_bytes);
        bytes.push(0);

        let base = self.leak(bytes_to_words(&bytes));
        self.records += 1;
        InterfaceId::from_raw(base.as_ptr() as usize as u64)
    }

    /// Composition admitting value types, requiring every interface listed.
    pub fn composition(&mut self, interfaces: &[InterfaceId]) -> TypeHandle {
        self.composition_with_flags(COMPOSITION_CLASS_CONSTRAINT_ANY, interfaces)
    }

    /// Class-constrained composition.
    pub fn reference_bound_composition(&mut self, interfaces: &[InterfaceId]) -> TypeHandle {
        self.composition_with_flags(0, interfaces)
    }

    /// Composition with a raw flags word.
    pub fn composition_with_flags(&mut self, flags: u32, interfaces: &[InterfaceId]) -> TypeHandle {
        let count = u32::try_from(interfaces.len()).unwrap_or(u32::MAX);
        let mut header = [0u8; WORD_SIZE];
        header[..4].copy_from_slice(&flags.to_ne_bytes());
        header[4..].copy_from_slice(&count.to_ne_bytes());

        let mut words = Vec::with_capacity(2 + interfaces.len());
        words.push(StructuralKind::InterfaceComposition.tag_word());
        words.push(u64::from_ne_bytes(header));
        words.extend(interfaces.iter().take(count as usize).map(|id| id.raw()));
        self.record(words)
    }

    /// Declare that `ty` conforms to `interface`.
    pub fn declare_conformance(&mut self, ty: TypeHandle, interface: InterfaceId) {
        self.conformances.push((ty, interface));
    }

    /// Slow reference check: linear scan over every declared conformance for
    /// each required interface. Reference-bound compositions additionally
    /// require a reference type.
    pub fn authoritative_conforms(&self, ty: TypeHandle, composition: CompositionHandle) -> bool {
        let parsed = composition.parse();
        if parsed.header.is_reference_bound() && ty.kind() != StructuralKind::ReferenceType {
            return false;
        }
        let mut interfaces = parsed.interfaces;
        interfaces.all(|interface| {
            self.conformances
                .iter()
                .any(|(candidate, declared)| *candidate == ty && *declared == interface)
        })
    }

    /// Conformance records keyed by descriptor (value records only).
    pub fn conformance_records(&self) -> Vec<ConformanceRecord> {
        self.conformances
            .iter()
            .filter_map(|(ty, interface)| {
                ty.descriptor().map(|descriptor| ConformanceRecord {
                    descriptor,
                    interface: *interface,
                })
            })
            .collect()
    }

    fn record(&mut self, words: Vec<u64>) -> TypeHandle {
        self.records += 1;
        TypeHandle::from_non_null(self.leak(words))
    }

    fn leak(&mut self, words: Vec<u64>) -> NonNull<u8> {
        self.leaked_bytes += words.len() * WORD_SIZE;
        let words: &'static mut [u64] = Box::leak(words.into_boxed_slice());
        NonNull::from(words).cast::<u8>()
    }
}

impl ConformanceSource for SyntheticRuntime {
    fn records(&mut self) -> Vec<ConformanceRecord> {
        self.conformance_records()
    }
}

fn bytes_to_words(bytes: &[u8]) -> Vec<u64> {
    bytes
        .chunks(WORD_SIZE)
        .map(|chunk| {
            let mut word = [0u8; WORD_SIZE];
            word[..chunk.len()].copy_from_slice(chunk);
            u64::from_ne_bytes(word)
        })
        .collect()
}
