// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attributed String is a Rust crate for Unicode text carrying typed attributes.
//!
//! An [`AttributedString`] pairs a text buffer with a list of runs. Each run covers a
//! span of the text and holds an immutable [`AttributeSet`], and neighboring runs
//! never hold equal sets. Attributes are declared as types implementing
//! [`AttributeKey`], so values come back out with their own types.
//!
//! ```
//! use attributed_string::{AttributeKey, AttributeSet, AttributedString};
//!
//! struct Size;
//!
//! impl AttributeKey for Size {
//!     type Value = f64;
//!     const NAME: &'static str = "Size";
//! }
//!
//! let mut text = AttributedString::from("Hello World");
//! let hello = text.start_index()..text.index_at_utf8_offset(5).unwrap();
//! text.slice_mut(hello).set::<Size>(12.0);
//!
//! let sizes: Vec<_> = text.runs().map(|run| run.get::<Size>().copied()).collect();
//! assert_eq!(sizes, [Some(12.0), None]);
//! ```
//!
//! Positions are [`Index`] values taken from the string itself. Editing the text
//! invalidates them; changing attributes does not.
//!
//! Strings can be archived to JSON with [`archive`] and converted to the UTF-16,
//! dictionary-based representation of host frameworks with a [`Converter`]. Both only
//! carry the keys of a [`Scope`].
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub mod archive;
mod attribute;
mod conversion;
mod error;
mod foreign;
mod guts;
mod run_list;
mod scope;
pub mod standard;
mod string;
mod text;
mod transform;
mod views;

pub use crate::attribute::{AttributeKey, AttributeSet, AttributeValue, Codec, MergePolicy};
pub use crate::conversion::{ConversionOptions, Converter};
pub use crate::error::{
    BoundaryInfo, CodecError, ConversionError, Endpoint, Error, RangeError, RangeErrorKind,
};
pub use crate::foreign::{
    ForeignAttributedString, ForeignAttributes, ForeignCodec, ForeignSpan, ForeignValue,
};
pub use crate::scope::{KeyDescriptor, Scope, ScopeProvider};
pub use crate::string::{AttributedString, AttributedSubstring, SearchOptions, SliceMut};
pub use crate::text::Index;
pub use crate::transform::AttributeTransformer;
pub use crate::views::{AttributeRuns, Characters, Run, Runs, UnicodeScalars};
