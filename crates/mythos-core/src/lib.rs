//! Mythos Core -- definition resolution for extension-based world content.
//!
//! This crate holds the pure, I/O-free half of the content pipeline: the
//! value model, reference parsing, the class registry, multi-parent abstract
//! inheritance, and assembly of concrete definitions (base entries, templates,
//! and instance graphs) from raw scanned data.
//!
//! # Resolution Order
//!
//! Content is resolved in a fixed sequence, each step depending on the whole
//! output of the previous one:
//!
//! 1. **Scan** -- every extension's raw maps are filled (see `mythos-data`).
//! 2. **Abstracts** -- [`abstracts::resolve_abstracts`] runs once over the
//!    union of all extensions' abstract entries.
//! 3. **Base** -- top-level definitions merge against the resolved abstracts.
//! 4. **Instances** -- [`assemble::assemble_instance`] builds every instance.
//! 5. **Templates** -- same single-pass merge as base.
//!
//! # Key Types
//!
//! - [`id::EntityKey`] -- the `(extension, kind, key)` identity triple.
//! - [`reference::resolve_reference`] -- short-form reference parsing.
//! - [`class::ClassRegistry`] -- memoizing class lookup over an injected
//!   [`class::ClassResolver`].
//! - [`abstracts::AbstractIndex`] -- the resolved abstract set.
//! - [`assemble::ResolvedDefinition`] -- a merged entry with its class bound.
//! - [`extension::Extension`] -- one content package, raw and resolved.
//! - [`error::ResolveError`] -- every fatal resolution failure.

pub mod abstracts;
pub mod assemble;
pub mod class;
pub mod error;
pub mod extension;
pub mod id;
pub mod reference;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::ResolveError;
pub use id::EntityKey;
pub use value::{DataMap, KindMap, Value};
