//! jadn-codec - A schema-driven value codec for JADN
//!
//! Compiles JADN type definitions into a symbol table and converts values
//! between their native form and one of four JSON wire forms.

pub mod cli;
pub mod codec;
pub mod format;
pub mod observability;
pub mod options;
pub mod schema;
pub mod value;

pub use codec::{Codec, CodecConfig, CodecError, CodecErrorCode, CodecResult, CompileError, WireMode};
pub use schema::{Schema, SchemaLoader};
pub use value::Value;
