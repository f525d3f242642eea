// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # conformgate - fast negative conformance checks
//!
//! Asking a language runtime "does this value's type conform to this
//! interface composition?" is expensive: the authoritative answer scans every
//! conformance record in the process. `conformgate` reads the type metadata
//! directly and answers the cheap half of the question. When it can prove the
//! answer is *no*, the authoritative check is skipped entirely.
//!
//! ## Quick Start
//!
//! ```rust
//! use conformgate::metadata::{CompositionHandle, SyntheticRuntime};
//! use conformgate::{ConformanceRegistry, ConformanceTable, FilterConfig, PossibilityFilter};
//!
//! let mut runtime = SyntheticRuntime::new();
//! let hashable = runtime.interface("Hashable");
//! let printable = runtime.interface("Printable");
//! let point = runtime.value_record();
//! runtime.declare_conformance(point, hashable);
//!
//! let wants_both = runtime.composition(&[hashable, printable]);
//!
//! let registry = ConformanceTable::new(runtime);
//! registry.build()?;
//! let filter = PossibilityFilter::with_config(registry, FilterConfig::default());
//!
//! // Point is known to be Hashable but not Printable: disproved without
//! // running the authoritative check.
//! assert!(!filter.is_possible_conformance(point, wants_both));
//! # Ok::<(), conformgate::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |   conform(value, composition, authoritative)                        |
//! +---------------------------------------------------------------------+
//! |   PossibilityFilter: classify -> descriptor -> composition -> AND   |
//! +-------------------------------+-------------------------------------+
//! |   metadata (typed views)      |   ConformanceRegistry (build once)  |
//! +-------------------------------+-------------------------------------+
//! |   metadata::layout: the only raw memory reads                       |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PossibilityFilter`] | Fast path; returns a [`Verdict`] or `bool` |
//! | [`TypeHandle`] | Read-only view of a metadata record |
//! | [`CompositionHandle`] | Validated interface composition |
//! | [`ConformanceTable`] | Build-once `(descriptor, interface)` set |
//! | [`DiagnosticCollector`] | Notices for compositions the fast path skips |
//!
//! ## Scope
//!
//! Only value-record types are ever disproved. Every other kind, and every
//! reference-bound composition, is reported as possible and left to the
//! authoritative check.

// Clippy: No blanket suppressions. Fix issues properly or use inline #[allow] with justification.

/// Layout constants and runtime filter configuration.
pub mod config;
/// Non-fatal notices (reference-bound compositions, unsupported kinds).
pub mod diagnostics;
/// Crate error type.
pub mod error;
/// The possibility filter and the `conform` wrapper.
pub mod filter;
/// Type metadata: classification, descriptors, compositions.
pub mod metadata;
/// Conformance registry trait and the build-once table.
pub mod registry;
/// Atomic filter counters.
pub mod stats;

pub use config::FilterConfig;
pub use diagnostics::{DiagnosticCollector, Notice, NoticeKind};
pub use error::{Error, Result};
pub use filter::{PossibilityFilter, Reason, Reflect, Verdict};
pub use metadata::{
    parse_composition, CompositionHandle, InterfaceId, StructuralKind, TypeDescriptor, TypeHandle,
};
pub use registry::{ConformanceRecord, ConformanceRegistry, ConformanceSource, ConformanceTable};
pub use stats::StatsSnapshot;

/// conformgate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
