// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::cast_possible_truncation)] // Test parameters

//! Concurrent query tests
//!
//! Many readers share one filter and one registry after a completed build.

use conformgate::metadata::{CompositionHandle, SyntheticRuntime};
use conformgate::{
    ConformanceRegistry, ConformanceTable, FilterConfig, InterfaceId, PossibilityFilter,
    TypeHandle, Verdict,
};
use std::sync::Arc;
use std::thread;

const TYPES: usize = 64;
const INTERFACES: usize = 8;
const THREADS: usize = 4;

struct Fixture {
    types: Vec<TypeHandle>,
    compositions: Vec<CompositionHandle>,
    expected: Vec<Vec<Verdict>>,
}

/// Type `t` conforms to interface `i` when `(t + i) % 3 != 0`.
fn fixture() -> (Fixture, ConformanceTable) {
    let mut rng = fastrand::Rng::with_seed(0xC0FF_EE00);
    let mut runtime = SyntheticRuntime::new();
    let interfaces: Vec<InterfaceId> = (0..INTERFACES)
        .map(|i| runtime.interface(&format!("Iface{}", i)))
        .collect();
    let types: Vec<TypeHandle> = (0..TYPES).map(|_| runtime.value_record()).collect();

    for (t, ty) in types.iter().enumerate() {
        for (i, iface) in interfaces.iter().enumerate() {
            if (t + i) % 3 != 0 {
                runtime.declare_conformance(*ty, *iface);
            }
        }
    }

    let compositions: Vec<CompositionHandle> = (0..16)
        .map(|_| {
            let len = rng.usize(0..=3);
            let required: Vec<InterfaceId> =
                (0..len).map(|_| interfaces[rng.usize(..INTERFACES)]).collect();
            CompositionHandle::new(runtime.composition(&required)).expect("composition")
        })
        .collect();

    let expected: Vec<Vec<Verdict>> = types
        .iter()
        .map(|ty| {
            compositions
                .iter()
                .map(|c| {
                    if runtime.authoritative_conforms(*ty, *c) {
                        Verdict::Possible(conformgate::Reason::AllInterfacesKnown)
                    } else {
                        let missing = c
                            .parse()
                            .interfaces
                            .find(|iface| {
                                let t = types.iter().position(|x| x == ty).unwrap_or(0);
                                let i = interfaces.iter().position(|x| x == iface).unwrap_or(0);
                                (t + i) % 3 == 0
                            })
                            .expect("a missing interface");
                        Verdict::Impossible { missing }
                    }
                })
                .collect()
        })
        .collect();

    let table = ConformanceTable::new(runtime);
    (
        Fixture {
            types,
            compositions,
            expected,
        },
        table,
    )
}

#[test]
fn test_readers_agree_after_build() {
    let (fixture, table) = fixture();
    table.build().expect("build");

    let filter = Arc::new(PossibilityFilter::with_config(table, FilterConfig::default()));
    let fixture = Arc::new(fixture);

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let filter = Arc::clone(&filter);
            let fixture = Arc::clone(&fixture);
            thread::spawn(move || {
                for (t, ty) in fixture.types.iter().enumerate() {
                    for (c, composition) in fixture.compositions.iter().enumerate() {
                        assert_eq!(
                            filter.check(*ty, *composition),
                            fixture.expected[t][c],
                            "type {} composition {}",
                            t,
                            c
                        );
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("reader thread");
    }

    let stats = filter.stats();
    assert_eq!(stats.queries, (THREADS * TYPES * 16) as u64);
}

#[test]
fn test_config_swap_under_load() {
    let (fixture, table) = fixture();
    table.build().expect("build");
    let filter = Arc::new(PossibilityFilter::with_config(table, FilterConfig::default()));
    let ty = fixture.types[0];
    let composition = fixture.compositions[0];
    let expected = fixture.expected[0][0];

    let reader = {
        let filter = Arc::clone(&filter);
        thread::spawn(move || {
            for _ in 0..1_000 {
                assert_eq!(filter.check(ty, composition), expected);
            }
        })
    };

    for round in 0..100 {
        filter.set_config(FilterConfig::default().with_diagnostics(round % 2 == 0));
    }
    reader.join().expect("reader thread");
}
