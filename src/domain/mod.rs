//! Domain models for bpm
//!
//! Source files move through three stages: raw bytes as loaded from a bundle,
//! indexed (declared package and imports known), and linked (every import
//! bound to the file declaring it).

pub mod bundle;
pub mod source;

pub use bundle::Bundle;
pub use source::{IndexedSourceFile, LinkedSourceFile, RawSourceFile};
