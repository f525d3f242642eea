// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type for conformgate operations.
//!
//! Unsupported-but-valid inputs (non value-record types, reference-bound
//! compositions) are never errors; they surface as
//! [`Verdict::Possible`](crate::filter::Verdict) instead. The raw-handle entry
//! points treat a misclassified composition as a contract violation and panic;
//! the variants below cover the typed, recoverable paths.

use crate::metadata::StructuralKind;
use std::str;

/// Errors returned by the typed metadata API and the conformance registry.
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Metadata Errors
    // ========================================================================
    /// Handle was expected to be an interface composition.
    NotAComposition {
        /// Kind the handle actually classified as.
        found: StructuralKind,
    },
    /// A null pointer was passed where a metadata record was expected.
    NullHandle,
    /// An interface descriptor's name was not valid UTF-8.
    InvalidInterfaceName(str::Utf8Error),

    // ========================================================================
    // Registry Errors
    // ========================================================================
    /// `build()` was invoked on a registry that is already built.
    RegistryAlreadyBuilt,
    /// The registry was used in a way that requires a completed `build()`.
    RegistryNotReady,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotAComposition { found } => write!(
                f,
                "Handle is not an interface composition (classified as {})",
                found
            ),
            Error::NullHandle => write!(f, "Null metadata handle"),
            Error::InvalidInterfaceName(e) => write!(f, "Invalid interface name: {}", e),
            Error::RegistryAlreadyBuilt => write!(f, "Conformance registry already built"),
            Error::RegistryNotReady => write!(f, "Conformance registry not built yet"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidInterfaceName(e) => Some(e),
            _ => None,
        }
    }
}

impl From<str::Utf8Error> for Error {
    fn from(value: str::Utf8Error) -> Self {
        Self::InvalidInterfaceName(value)
    }
}

/// Convenient alias for results using the crate `Error` type.
pub type Result<T> = core::result::Result<T, Error>;
