// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Possibility filter.
//!
//! Answers "could this type conform to this composition?" from metadata and
//! the registry alone. `false` is a proof of non-conformance; `true` only means
//! the fast path could not disprove it and the authoritative check must run.
//!
//! # Decision order
//!
//! 1. Composition must classify as an interface composition (contract).
//! 2. Type without a value-record descriptor: possible.
//! 3. Reference-bound composition: possible, with a diagnostic notice.
//! 4. Every required interface known for the descriptor: possible.
//!    Otherwise impossible, naming the first missing interface.
//!
//! # Preconditions
//!
//! The registry's `build()` must complete-before the queries whose answers
//! matter. The filter never builds or mutates the registry.

use crate::config::FilterConfig;
use crate::diagnostics::{DiagnosticCollector, Notice, NoticeKind};
use crate::metadata::{
    expect_composition, CompositionHandle, InterfaceId, ParsedComposition, StructuralKind,
    TypeDescriptor, TypeHandle,
};
use crate::registry::ConformanceRegistry;
use crate::stats::{FilterStats, StatsSnapshot};
use arc_swap::ArcSwap;
use std::fmt;
use std::sync::Arc;

/// Values that can report the metadata record of their dynamic type.
pub trait Reflect {
    fn type_handle(&self) -> TypeHandle;
}

impl Reflect for TypeHandle {
    fn type_handle(&self) -> TypeHandle {
        *self
    }
}

/// Why a query could not be disproved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    /// The type is not a value record; no disproof is attempted.
    UnsupportedKind(StructuralKind),
    /// The composition is class constrained; no disproof is attempted.
    ReferenceBound,
    /// The registry knows every required conformance.
    AllInterfacesKnown,
}

/// Outcome of a fast-path query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Possible(Reason),
    /// Conformance is impossible: the registry lacks `missing`.
    Impossible { missing: InterfaceId },
}

impl Verdict {
    #[inline]
    pub fn is_possible(self) -> bool {
        matches!(self, Verdict::Possible(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Possible(Reason::UnsupportedKind(kind)) => {
                write!(f, "possible (unsupported kind {})", kind)
            }
            Verdict::Possible(Reason::ReferenceBound) => {
                write!(f, "possible (reference-bound composition)")
            }
            Verdict::Possible(Reason::AllInterfacesKnown) => {
                write!(f, "possible (all interfaces known)")
            }
            Verdict::Impossible { missing } => write!(f, "impossible (missing {})", missing),
        }
    }
}

/// Fast conformance pre-filter over a [`ConformanceRegistry`].
pub struct PossibilityFilter<R> {
    registry: R,
    config: ArcSwap<FilterConfig>,
    stats: FilterStats,
    diagnostics: DiagnosticCollector,
}

impl<R: ConformanceRegistry> PossibilityFilter<R> {
    /// Filter configured from the `CONFORMGATE_*` environment variables.
    pub fn new(registry: R) -> Self {
        Self::with_config(registry, FilterConfig::from_env())
    }

    pub fn with_config(registry: R, config: FilterConfig) -> Self {
        if !registry.is_ready() {
            log::debug!("[filter] created over a registry that is not built yet");
        }
        Self {
            registry,
            config: ArcSwap::from_pointee(config),
            stats: FilterStats::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn config(&self) -> FilterConfig {
        **self.config.load()
    }

    /// Swap the configuration. Queries already running keep the old one.
    pub fn set_config(&self, config: FilterConfig) {
        self.config.store(Arc::new(config));
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    pub fn diagnostics(&self) -> &DiagnosticCollector {
        &self.diagnostics
    }

    /// `false` when `ty` provably cannot conform to `composition`.
    ///
    /// # Panics
    ///
    /// Panics if `composition` is not an interface composition. Reading any
    /// other record as one would walk unrelated memory.
    pub fn is_possible_conformance(&self, ty: TypeHandle, composition: TypeHandle) -> bool {
        self.check(ty, expect_composition(composition)).is_possible()
    }

    /// Run the fast path and report which branch decided.
    pub fn check(&self, ty: TypeHandle, composition: CompositionHandle) -> Verdict {
        self.stats.record_query();
        let config = self.config();

        // Only the value-record layout has a validated descriptor offset.
        // Everything else is left to the authoritative check.
        let descriptor = match ty.descriptor() {
            Some(descriptor) => descriptor,
            None => {
                let kind = ty.kind();
                self.stats.record_unsupported_kind();
                if config.log_unsupported_kinds {
                    self.notice(NoticeKind::UnsupportedTypeKind(kind), ty, composition, &config);
                }
                return Verdict::Possible(Reason::UnsupportedKind(kind));
            }
        };

        let ParsedComposition { header, interfaces } = composition.parse();

        // Class-constrained compositions would also need the type's class
        // hierarchy, which the registry does not model.
        if header.is_reference_bound() {
            self.stats.record_reference_bound();
            self.notice(NoticeKind::ReferenceBoundComposition, ty, composition, &config);
            return Verdict::Possible(Reason::ReferenceBound);
        }

        // Conjunction over the required interfaces; the first gap disproves.
        let mut lookups = 0;
        let mut verdict = Verdict::Possible(Reason::AllInterfacesKnown);
        for interface in interfaces {
            lookups += 1;
            if !self.registry.contains(descriptor, interface) {
                verdict = Verdict::Impossible { missing: interface };
                break;
            }
        }
        self.stats.record_registry_lookups(lookups);

        if let Verdict::Impossible { missing } = verdict {
            self.stats.record_disproved();
            trace_disproof(ty, descriptor, composition, missing);
        }
        verdict
    }

    /// Re-view `value` through a composition.
    ///
    /// Runs the fast path once; only when it cannot disprove conformance does
    /// `authoritative` run, at most once. Returns `None` when either says no.
    pub fn conform<'a, V, I, F>(
        &self,
        value: &'a V,
        composition: CompositionHandle,
        authoritative: F,
    ) -> Option<&'a I>
    where
        V: Reflect + ?Sized,
        I: ?Sized,
        F: FnOnce(&'a V) -> Option<&'a I>,
    {
        if !self.check(value.type_handle(), composition).is_possible() {
            return None;
        }
        let viewed = authoritative(value);
        self.stats.record_authoritative(viewed.is_some());
        viewed
    }

    fn notice(
        &self,
        kind: NoticeKind,
        ty: TypeHandle,
        composition: CompositionHandle,
        config: &FilterConfig,
    ) {
        let notice = Notice {
            kind,
            type_handle: ty,
            composition,
        };
        self.diagnostics.report(notice, config.diagnostics);
    }
}

fn trace_disproof(
    ty: TypeHandle,
    descriptor: TypeDescriptor,
    composition: CompositionHandle,
    missing: InterfaceId,
) {
    log::trace!(
        "[filter] {} (descriptor {}) cannot conform to {}: missing interface {}",
        ty,
        descriptor,
        composition.handle(),
        missing
    );
}

impl<R> fmt::Debug for PossibilityFilter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PossibilityFilter")
            .field("config", &**self.config.load())
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}
