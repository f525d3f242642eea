// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Non-fatal notices raised by the fast path.
//!
//! Every notice goes to the `log` facade: the first sighting of a given
//! `(kind, composition)` pair at `warn`, repeats at `debug`. Retaining notices
//! for later inspection is opt-in (`FilterConfig::diagnostics`) and bounded:
//! once the buffer holds `capacity` notices the oldest one is dropped.

use crate::metadata::{CompositionHandle, StructuralKind, TypeHandle};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Why the fast path gave up on a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// Composition is class constrained; the fast path does not handle it.
    ReferenceBoundComposition,
    /// Type is not a value record (only reported when enabled).
    UnsupportedTypeKind(StructuralKind),
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeKind::ReferenceBoundComposition => {
                write!(f, "reference-bound composition not supported by the fast path")
            }
            NoticeKind::UnsupportedTypeKind(kind) => {
                write!(f, "type kind {} not supported by the fast path", kind)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub type_handle: TypeHandle,
    pub composition: CompositionHandle,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (type {}, composition {})",
            self.kind,
            self.type_handle,
            self.composition.handle()
        )
    }
}

/// Thread-safe notice sink shared by every query of one filter.
#[derive(Debug)]
pub struct DiagnosticCollector {
    /// Ring buffer of retained notices
    notices: RwLock<VecDeque<Notice>>,
    capacity: usize,
    evicted: AtomicU64,
    occurrences: DashMap<(NoticeKind, CompositionHandle), u64>,
}

impl DiagnosticCollector {
    /// Notices retained by [`new`](Self::new).
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Collector retaining at most `capacity` notices (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            notices: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
            evicted: AtomicU64::new(0),
            occurrences: DashMap::new(),
        }
    }

    /// Log `notice` and count it. Returns how many times this
    /// `(kind, composition)` pair has now been seen.
    ///
    /// The notice is kept for [`notices`](Self::notices) only if `retain`.
    /// If the buffer is full, the oldest retained notice is dropped (FIFO).
    pub fn report(&self, notice: Notice, retain: bool) -> u64 {
        let seen = {
            let mut count = self
                .occurrences
                .entry((notice.kind, notice.composition))
                .or_insert(0);
            *count += 1;
            *count
        };

        if seen == 1 {
            log::warn!("[diagnostics] {}", notice);
        } else {
            log::debug!("[diagnostics] {} (seen {} times)", notice, seen);
        }

        if retain {
            let mut notices = self.notices.write();
            if notices.len() >= self.capacity {
                notices.pop_front();
                self.evicted.fetch_add(1, Ordering::Relaxed);
            }
            notices.push_back(notice);
        }
        seen
    }

    /// Times `kind` was reported for `composition`.
    pub fn occurrences(&self, kind: NoticeKind, composition: CompositionHandle) -> u64 {
        self.occurrences
            .get(&(kind, composition))
            .map_or(0, |count| *count)
    }

    /// Copy of the retained notices, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.read().iter().copied().collect()
    }

    /// Take the retained notices. Occurrence counts are kept.
    pub fn drain(&self) -> Vec<Notice> {
        self.notices.write().drain(..).collect()
    }

    /// Maximum number of retained notices.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained notices dropped to stay within capacity.
    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.notices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DiagnosticCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::SyntheticRuntime;

    fn notice(runtime: &mut SyntheticRuntime, kind: NoticeKind) -> Notice {
        let composition = CompositionHandle::new(runtime.reference_bound_composition(&[]))
            .expect("composition");
        Notice {
            kind,
            type_handle: runtime.value_record(),
            composition,
        }
    }

    #[test]
    fn test_occurrences_dedup_per_composition() {
        let mut runtime = SyntheticRuntime::new();
        let collector = DiagnosticCollector::new();
        let first = notice(&mut runtime, NoticeKind::ReferenceBoundComposition);
        let other = notice(&mut runtime, NoticeKind::ReferenceBoundComposition);

        assert_eq!(collector.report(first, false), 1);
        assert_eq!(collector.report(first, false), 2);
        assert_eq!(collector.report(other, false), 1);

        assert_eq!(
            collector.occurrences(NoticeKind::ReferenceBoundComposition, first.composition),
            2
        );
        assert_eq!(
            collector.occurrences(
                NoticeKind::UnsupportedTypeKind(StructuralKind::Tuple),
                first.composition
            ),
            0
        );
        assert!(collector.is_empty());
    }

    #[test]
    fn test_retained_notices_drain() {
        let mut runtime = SyntheticRuntime::new();
        let collector = DiagnosticCollector::new();
        let a = notice(&mut runtime, NoticeKind::ReferenceBoundComposition);
        let b = notice(
            &mut runtime,
            NoticeKind::UnsupportedTypeKind(StructuralKind::Function),
        );

        collector.report(a, true);
        collector.report(b, true);
        assert_eq!(collector.notices(), vec![a, b]);

        assert_eq!(collector.drain(), vec![a, b]);
        assert!(collector.is_empty());
        assert_eq!(collector.occurrences(a.kind, a.composition), 1);
    }

    #[test]
    fn test_retention_is_bounded() {
        let mut runtime = SyntheticRuntime::new();
        let collector = DiagnosticCollector::with_capacity(4);
        let notices: Vec<Notice> = (0..10)
            .map(|_| notice(&mut runtime, NoticeKind::ReferenceBoundComposition))
            .collect();

        for _ in 0..10 {
            for n in &notices {
                collector.report(*n, true);
            }
        }

        assert_eq!(collector.capacity(), 4);
        assert_eq!(collector.len(), 4);
        assert_eq!(collector.evicted(), 96);
        // Newest survive, oldest first.
        assert_eq!(collector.notices(), notices[6..].to_vec());
        // Counting is unaffected by eviction.
        let first = notices[0].composition;
        assert_eq!(
            collector.occurrences(NoticeKind::ReferenceBoundComposition, first),
            10
        );
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut runtime = SyntheticRuntime::new();
        let collector = DiagnosticCollector::with_capacity(0);
        let a = notice(&mut runtime, NoticeKind::ReferenceBoundComposition);
        let b = notice(&mut runtime, NoticeKind::ReferenceBoundComposition);

        collector.report(a, true);
        collector.report(b, true);
        assert_eq!(collector.capacity(), 1);
        assert_eq!(collector.drain(), vec![b]);
        assert_eq!(collector.evicted(), 1);
        assert_eq!(
            DiagnosticCollector::default().capacity(),
            DiagnosticCollector::DEFAULT_CAPACITY
        );
    }

    #[test]
    fn test_notice_display() {
        let kind = NoticeKind::UnsupportedTypeKind(StructuralKind::Tuple);
        assert_eq!(
            kind.to_string(),
            "type kind tuple not supported by the fast path"
        );
    }
}
