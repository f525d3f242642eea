// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type metadata: classification, descriptors, interface compositions.
//!
//! # Overview
//!
//! - **[`StructuralKind`]**: coarse kind decoded from a record's tag word
//! - **[`TypeHandle`]**: read-only view of a metadata record
//! - **[`TypeDescriptor`]**: registry key of a value record
//! - **[`CompositionHandle`]**: validated interface-composition record
//! - **[`InterfaceId`]**: one required interface of a composition
//!
//! ```
//! use conformgate::metadata::{parse_composition, InterfaceId, StructuralKind, SyntheticRuntime};
//!
//! let mut runtime = SyntheticRuntime::new();
//! let ty = runtime.value_record();
//! assert_eq!(ty.kind(), StructuralKind::ValueRecord);
//!
//! let composition = runtime.composition(&[InterfaceId::from_raw(0x111)]);
//! let parsed = parse_composition(composition);
//! assert_eq!(parsed.header.interface_count, 1);
//! ```
//!
//! Raw memory is only read in [`layout`]; everything else consumes the
//! typed values it produces.

mod composition;
mod handle;
mod interface;
mod kind;
pub mod layout;
pub mod synth;

pub use composition::{
    parse_composition, CompositionFlags, CompositionHandle, CompositionHeader, InterfaceIter,
    ParsedComposition, SpecialInterface,
};
pub(crate) use composition::expect_composition;
pub use handle::{TypeDescriptor, TypeHandle};
pub use interface::{InterfaceId, InterfaceInfo};
pub use kind::StructuralKind;
pub use synth::SyntheticRuntime;
