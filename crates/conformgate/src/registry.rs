// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conformance registry: build once, read many.
//!
//! The filter only sees the [`ConformanceRegistry`] trait. [`ConformanceTable`]
//! is the stock implementation: it drains a [`ConformanceSource`] once and
//! publishes the resulting set through an `ArcSwapOption`.
//!
//! # Ordering
//!
//! `build()` must complete-before any `contains()` whose answer matters. The
//! table's publish is a release store and every lookup an acquire load, so a
//! reader that observes the table also observes every record in it. Lookups
//! that race ahead of the build see "not ready" and answer `false`.
//!
//! # Example
//!
//! ```
//! use conformgate::metadata::{InterfaceId, TypeDescriptor};
//! use conformgate::registry::{ConformanceRecord, ConformanceRegistry, ConformanceTable};
//!
//! let record = ConformanceRecord {
//!     descriptor: TypeDescriptor::from_raw(0xABC),
//!     interface: InterfaceId::from_raw(0x111),
//! };
//! let table = ConformanceTable::new(vec![record]);
//! table.build().unwrap();
//!
//! assert!(table.contains(record.descriptor, record.interface));
//! assert!(!table.contains(record.descriptor, InterfaceId::from_raw(0x222)));
//! ```

use crate::error::{Error, Result};
use crate::metadata::{InterfaceId, TypeDescriptor};
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Set of known-true `(descriptor, interface)` conformances.
pub trait ConformanceRegistry: Send + Sync {
    /// Populate the registry. Called once, before the first query.
    fn build(&self) -> Result<()>;

    fn is_ready(&self) -> bool;

    /// Pure query: does `descriptor` conform to `interface`?
    fn contains(&self, descriptor: TypeDescriptor, interface: InterfaceId) -> bool;
}

impl<R: ConformanceRegistry + ?Sized> ConformanceRegistry for Arc<R> {
    fn build(&self) -> Result<()> {
        (**self).build()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn contains(&self, descriptor: TypeDescriptor, interface: InterfaceId) -> bool {
        (**self).contains(descriptor, interface)
    }
}

impl<R: ConformanceRegistry + ?Sized> ConformanceRegistry for &R {
    fn build(&self) -> Result<()> {
        (**self).build()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn contains(&self, descriptor: TypeDescriptor, interface: InterfaceId) -> bool {
        (**self).contains(descriptor, interface)
    }
}

/// One known conformance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConformanceRecord {
    pub descriptor: TypeDescriptor,
    pub interface: InterfaceId,
}

/// Producer of conformance records, drained by [`ConformanceTable::build`].
pub trait ConformanceSource: Send {
    fn records(&mut self) -> Vec<ConformanceRecord>;
}

impl ConformanceSource for Vec<ConformanceRecord> {
    fn records(&mut self) -> Vec<ConformanceRecord> {
        std::mem::take(self)
    }
}

/// Hash-set backed [`ConformanceRegistry`].
pub struct ConformanceTable {
    /// Taken (set to `None`) by the first `build()`.
    source: Mutex<Option<Box<dyn ConformanceSource>>>,
    table: ArcSwapOption<HashSet<ConformanceRecord>>,
    warned_not_ready: AtomicBool,
}

impl ConformanceTable {
    /// Table that will be filled from `source` on [`build`](ConformanceRegistry::build).
    pub fn new<S: ConformanceSource + 'static>(source: S) -> Self {
        Self {
            source: Mutex::new(Some(Box::new(source))),
            table: ArcSwapOption::empty(),
            warned_not_ready: AtomicBool::new(false),
        }
    }

    /// Table built immediately from `records`.
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ConformanceRecord>,
    {
        let table = Self {
            source: Mutex::new(None),
            table: ArcSwapOption::empty(),
            warned_not_ready: AtomicBool::new(false),
        };
        table.publish(records.into_iter().collect());
        table
    }

    /// Number of distinct records (0 before build).
    pub fn len(&self) -> usize {
        self.table.load().as_ref().map_or(0, |set| set.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn publish(&self, set: HashSet<ConformanceRecord>) {
        self.table.store(Some(Arc::new(set)));
    }
}

impl ConformanceRegistry for ConformanceTable {
    fn build(&self) -> Result<()> {
        let started = Instant::now();
        // Holding the source lock across the publish serializes racing builds:
        // the loser finds `None` and the table already in place.
        let mut guard = self.source.lock();
        let mut source = guard.take().ok_or(Error::RegistryAlreadyBuilt)?;
        let set: HashSet<ConformanceRecord> = source.records().into_iter().collect();
        let count = set.len();
        self.publish(set);
        drop(guard);

        log::debug!(
            "[registry] built {} records in {:?}",
            count,
            started.elapsed()
        );
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.table.load().is_some()
    }

    fn contains(&self, descriptor: TypeDescriptor, interface: InterfaceId) -> bool {
        match &*self.table.load() {
            Some(set) => set.contains(&ConformanceRecord {
                descriptor,
                interface,
            }),
            None => {
                if !self.warned_not_ready.swap(true, Ordering::Relaxed) {
                    log::warn!("[registry] {} (answering false)", Error::RegistryNotReady);
                }
                false
            }
        }
    }
}

impl std::fmt::Debug for ConformanceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConformanceTable")
            .field("ready", &self.is_ready())
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn record(descriptor: u64, interface: u64) -> ConformanceRecord {
        ConformanceRecord {
            descriptor: TypeDescriptor::from_raw(descriptor),
            interface: InterfaceId::from_raw(interface),
        }
    }

    #[test]
    fn test_contains_after_build() {
        let table = ConformanceTable::new(vec![record(0xABC, 0x111), record(0xABC, 0x111)]);
        assert!(!table.is_ready());
        table.build().expect("build");
        assert!(table.is_ready());
        assert_eq!(table.len(), 1);
        assert!(table.contains(TypeDescriptor::from_raw(0xABC), InterfaceId::from_raw(0x111)));
        assert!(!table.contains(TypeDescriptor::from_raw(0xABC), InterfaceId::from_raw(0x222)));
        assert!(!table.contains(TypeDescriptor::from_raw(0xDEF), InterfaceId::from_raw(0x111)));
    }

    #[test]
    fn test_contains_before_build_is_false() {
        let table = ConformanceTable::new(vec![record(1, 2)]);
        assert!(!table.contains(TypeDescriptor::from_raw(1), InterfaceId::from_raw(2)));
        assert!(!table.contains(TypeDescriptor::from_raw(1), InterfaceId::from_raw(2)));
        assert!(table.is_empty());
    }

    #[test]
    fn test_double_build_is_rejected() {
        let table = ConformanceTable::new(Vec::new());
        table.build().expect("first build");
        assert!(matches!(table.build(), Err(Error::RegistryAlreadyBuilt)));
        assert!(table.is_ready());
    }

    #[test]
    fn test_with_records_is_ready() {
        let table = ConformanceTable::with_records([record(7, 8)]);
        assert!(table.is_ready());
        assert!(table.contains(TypeDescriptor::from_raw(7), InterfaceId::from_raw(8)));
        assert!(matches!(table.build(), Err(Error::RegistryAlreadyBuilt)));
    }

    #[test]
    fn test_blanket_impls() {
        let table = Arc::new(ConformanceTable::with_records([record(7, 8)]));
        let by_ref: &ConformanceTable = &table;
        assert!(ConformanceRegistry::contains(
            &by_ref,
            TypeDescriptor::from_raw(7),
            InterfaceId::from_raw(8)
        ));
        assert!(ConformanceRegistry::is_ready(&table));
    }

    #[test]
    fn test_concurrent_readers_agree() {
        let records: Vec<_> = (0..256).map(|i| record(i, i * 2)).collect();
        let table = Arc::new(ConformanceTable::new(records));
        table.build().expect("build");

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let table = Arc::clone(&table);
                thread::spawn(move || {
                    (0..256u64)
                        .filter(|i| {
                            table.contains(TypeDescriptor::from_raw(*i), InterfaceId::from_raw(i * 2))
                        })
                        .count()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().expect("reader thread"), 256);
        }
    }
}
