//! Text and binary encodings of temporal values.

#[cfg(feature = "binary")]
pub mod binary;
pub mod text;

#[cfg(feature = "binary")]
pub use binary::{from_bytes, to_bytes};
pub use text::TextParser;
