//! JADN schema documents
//!
//! A schema is a list of type definitions in tuple form:
//!
//! ```text
//! [name, base type, [option, ...], description, [field or item, ...]]
//! ```
//!
//! Definitions are immutable once loaded. Option strings stay packed here; the
//! codec decodes them when it compiles the schema.

mod errors;
mod loader;
mod types;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use loader::SchemaLoader;
pub use types::{BaseType, EnumItem, FieldDef, Fields, Meta, Schema, TypeDef};
