//! Registry retrieval and per-registry record parsers.
//!
//! This crate provides:
//! - [`Retriever`]: shared HTTP client with bounded timeouts and status checks
//! - [`parsers`]: one line parser per registry layout
//! - [`Source`]: a registry endpoint paired with its layout and failure policy

pub mod parsers;
pub mod retriever;
pub mod source;

pub use parsers::SourceKind;
pub use retriever::{Retriever, split_lines};
pub use source::Source;
