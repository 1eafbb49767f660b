//! Mythos Data -- reading extension content trees into raw maps.
//!
//! Data files may be RON (`.ron`), TOML (`.toml`) or JSON (`.json`). Each file
//! can hold several documents; they merge at the top level with the later
//! document winning. See [`scanner`] for the directory layout.

pub mod loader;
pub mod scanner;
pub mod source;

pub use loader::{DataLoadError, Format};
pub use scanner::scan_extension;
pub use source::{ContentSource, FsSource, MemorySource};
