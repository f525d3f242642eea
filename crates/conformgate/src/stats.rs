// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Filter counters.
//!
//! Thread-safe: plain atomics with Relaxed ordering. A snapshot is a set of
//! independent loads, not a consistent cut.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct FilterStats {
    queries: AtomicU64,
    disproved: AtomicU64,
    unsupported_kind: AtomicU64,
    reference_bound: AtomicU64,
    registry_lookups: AtomicU64,
    authoritative_checks: AtomicU64,
    authoritative_hits: AtomicU64,
}

impl FilterStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_disproved(&self) {
        self.disproved.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_unsupported_kind(&self) {
        self.unsupported_kind.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_reference_bound(&self) {
        self.reference_bound.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_registry_lookups(&self, count: u64) {
        self.registry_lookups.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_authoritative(&self, hit: bool) {
        self.authoritative_checks.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.authoritative_hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            queries: self.queries.load(Ordering::Relaxed),
            disproved: self.disproved.load(Ordering::Relaxed),
            unsupported_kind: self.unsupported_kind.load(Ordering::Relaxed),
            reference_bound: self.reference_bound.load(Ordering::Relaxed),
            registry_lookups: self.registry_lookups.load(Ordering::Relaxed),
            authoritative_checks: self.authoritative_checks.load(Ordering::Relaxed),
            authoritative_hits: self.authoritative_hits.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.queries,
            &self.disproved,
            &self.unsupported_kind,
            &self.reference_bound,
            &self.registry_lookups,
            &self.authoritative_checks,
            &self.authoritative_hits,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time copy of [`FilterStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Fast-path evaluations.
    pub queries: u64,
    /// Queries answered "impossible".
    pub disproved: u64,
    /// Queries on a type that is not a value record.
    pub unsupported_kind: u64,
    /// Queries on a reference-bound composition.
    pub reference_bound: u64,
    /// `contains` calls issued to the registry.
    pub registry_lookups: u64,
    /// Authoritative checks run by `conform`.
    pub authoritative_checks: u64,
    /// Authoritative checks that succeeded.
    pub authoritative_hits: u64,
}

impl StatsSnapshot {
    /// Share of queries settled without the authoritative check (0.0 when idle).
    pub fn fast_path_ratio(&self) -> f64 {
        if self.queries == 0 {
            return 0.0;
        }
        self.disproved as f64 / self.queries as f64
    }
}
