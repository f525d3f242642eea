// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! conformgate Global Configuration
//!
//! Centralizes the metadata layout constants and the runtime filter
//! configuration. Layout bits live here and nowhere else.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: Compile-time constants (kind flags, composition flag masks)
//! - **Level 2 (Dynamic)**: [`FilterConfig`] read from the environment and swapped
//!   atomically inside [`PossibilityFilter`](crate::PossibilityFilter)
//!
//! # Example
//!
//! ```
//! use conformgate::config::{FilterConfig, KIND_IS_NON_HEAP};
//!
//! assert_eq!(KIND_IS_NON_HEAP, 0x200);
//!
//! let config = FilterConfig::default().with_diagnostics(true);
//! assert!(config.diagnostics);
//! ```

// =======================================================================
// Tag word flags
// =======================================================================

/// Kind is a value that does not live on the heap.
pub const KIND_IS_NON_HEAP: u64 = 0x200;

/// Kind is private to the runtime (not directly exposed to the language).
pub const KIND_IS_RUNTIME_PRIVATE: u64 = 0x100;

/// Kind does not describe a language-level type (heap boxes, error boxes).
pub const KIND_IS_NON_TYPE: u64 = 0x400;

// =======================================================================
// Composition flags (32-bit word following the tag word)
// =======================================================================

/// Class-constraint bit. Clear = reference-bound, set = any type allowed.
pub const COMPOSITION_CLASS_CONSTRAINT_ANY: u32 = 0x8000_0000;

/// Composition carries an explicit superclass constraint.
pub const COMPOSITION_HAS_SUPERCLASS: u32 = 0x4000_0000;

/// Special-interface field (error interface and friends).
pub const COMPOSITION_SPECIAL_INTERFACE_MASK: u32 = 0x3F00_0000;

/// Shift for [`COMPOSITION_SPECIAL_INTERFACE_MASK`].
pub const COMPOSITION_SPECIAL_INTERFACE_SHIFT: u32 = 24;

/// Number of witness tables an existential container of this composition holds.
pub const COMPOSITION_WITNESS_TABLE_MASK: u32 = 0x00FF_FFFF;

// =======================================================================
// Environment switches
// =======================================================================

/// Enables notice collection in the diagnostic collector.
pub const ENV_DIAGNOSTICS: &str = "CONFORMGATE_DIAGNOSTICS";

/// Records a notice for every non value-record type the fast path skips.
pub const ENV_LOG_UNSUPPORTED: &str = "CONFORMGATE_LOG_UNSUPPORTED";

/// Runtime configuration of a [`PossibilityFilter`](crate::PossibilityFilter).
///
/// All switches default to off; the fast path then does nothing beyond the
/// registry lookups and the mandatory reference-bound warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterConfig {
    /// Keep notices in the diagnostic collector (they are always logged).
    pub diagnostics: bool,
    /// Emit a notice when the type is not a value record.
    pub log_unsupported_kinds: bool,
}

impl FilterConfig {
    /// Build a configuration from `CONFORMGATE_*` environment variables.
    ///
    /// A variable counts as set when present and not `0`/`false`.
    pub fn from_env() -> Self {
        Self {
            diagnostics: env_flag(ENV_DIAGNOSTICS),
            log_unsupported_kinds: env_flag(ENV_LOG_UNSUPPORTED),
        }
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    pub fn with_log_unsupported_kinds(mut self, enabled: bool) -> Self {
        self.log_unsupported_kinds = enabled;
        self
    }
}

fn env_flag(name: &str) -> bool {
    match std::env::var(name) {
        Ok(value) => parse_flag(&value),
        Err(_) => false,
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "off" | "no"
    )
}
