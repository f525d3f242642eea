// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use conformgate::{
    CompositionHandle, ConformanceRecord, ConformanceTable, FilterConfig, InterfaceId,
    PossibilityFilter, StructuralKind, TypeDescriptor, TypeHandle, Verdict,
};
use libfuzzer_sys::fuzz_target;

// Input layout:
//   byte 0      composition flags (high byte)
//   byte 1      number of known conformances
//   rest        interface identifiers, one byte each
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let flags = u32::from(data[0]) << 24;
    let ids: Vec<u64> = data[2..].iter().map(|b| u64::from(*b) + 1).collect();
    let known = usize::from(data[1]).min(ids.len());

    // Records live on this stack frame for the whole iteration.
    let value = [StructuralKind::ValueRecord.tag_word(), 0xABC];
    let mut composition = vec![
        StructuralKind::InterfaceComposition.tag_word(),
        u64::from_ne_bytes(header(flags, ids.len() as u32)),
    ];
    composition.extend_from_slice(&ids);

    // SAFETY: both buffers are aligned u64 records matching their tag words and
    // outlive every handle created here.
    let (ty, composition) = unsafe {
        (
            TypeHandle::from_ptr(value.as_ptr().cast()).expect("non-null"),
            TypeHandle::from_ptr(composition.as_ptr().cast()).expect("non-null"),
        )
    };
    let composition = CompositionHandle::new(composition).expect("composition");

    let parsed = composition.parse();
    assert_eq!(parsed.header.interface_count as usize, ids.len());
    let parsed_ids: Vec<u64> = parsed.interfaces.map(InterfaceId::raw).collect();
    assert_eq!(parsed_ids, ids);

    let registry = ConformanceTable::with_records(ids[..known].iter().map(|id| ConformanceRecord {
        descriptor: TypeDescriptor::from_raw(0xABC),
        interface: InterfaceId::from_raw(*id),
    }));
    let filter = PossibilityFilter::with_config(registry, FilterConfig::default());

    match filter.check(ty, composition) {
        Verdict::Impossible { missing } => {
            assert!(!composition.header().is_reference_bound());
            assert!(!ids[..known].contains(&missing.raw()));
        }
        Verdict::Possible(_) => {
            if !composition.header().is_reference_bound() {
                assert!(ids.iter().all(|id| ids[..known].contains(id)));
            }
        }
    }
});

fn header(flags: u32, count: u32) -> [u8; 8] {
    let mut bytes = [0u8; 8];
    bytes[..4].copy_from_slice(&flags.to_ne_bytes());
    bytes[4..].copy_from_slice(&count.to_ne_bytes());
    bytes
}
