//! Schema-driven codec
//!
//! A [`Codec`] compiles a schema for one [`WireMode`] into a symbol table and
//! then converts values between their native form ([`Value`]) and their wire
//! form (`serde_json::Value`).
//!
//! # Design
//!
//! - Compilation happens once, at construction or on [`Codec::set_mode`]
//! - Every per-type function receives the codec, so nested types recurse through it
//! - A compiled codec is immutable and may be shared across threads
//! - The codec reports; it never logs
//!
//! # Usage
//!
//! ```ignore
//! use jadn_codec::codec::{Codec, WireMode};
//!
//! let codec = Codec::new(schema, WireMode::VERBOSE)?;
//! let wire = codec.encode("Point", &point)?;
//! let back = codec.decode("Point", &wire)?;
//! ```

mod config;
mod decode;
mod encode;
mod errors;
mod general;
pub mod symtab;

pub use config::{CodecConfig, UndefinedTypePolicy, WireMode};
pub use errors::{
    CodecError, CodecErrorCode, CodecResult, CompileError, Diagnostic, DiagnosticCode, DiagnosticLevel,
};
pub use symtab::{SymbolEntry, SymbolTable, TypeId, TypeRef, WireKey, WireType};

use serde_json::Value as Json;

use crate::format::FormatRegistry;
use crate::schema::Schema;
use crate::value::Value;

/// Compiled schema plus the settings it was compiled with
#[derive(Debug, Clone)]
pub struct Codec {
    schema: Schema,
    mode: WireMode,
    config: CodecConfig,
    registry: FormatRegistry,
    table: SymbolTable,
    diagnostics: Vec<Diagnostic>,
}

impl Codec {
    /// Compiles `schema` with the default config and the standard formats
    pub fn new(schema: Schema, mode: WireMode) -> Result<Self, CompileError> {
        Self::with_config(schema, mode, CodecConfig::default(), FormatRegistry::standard())
    }

    pub fn with_config(
        schema: Schema,
        mode: WireMode,
        config: CodecConfig,
        registry: FormatRegistry,
    ) -> Result<Self, CompileError> {
        let (table, diagnostics) = symtab::compile(&schema, mode, &config, &registry)?;
        Ok(Self {
            schema,
            mode,
            config,
            registry,
            table,
            diagnostics,
        })
    }

    /// Recompiles the whole table for another wire mode.
    ///
    /// On failure the codec keeps its previous mode and table.
    pub fn set_mode(&mut self, mode: WireMode) -> Result<(), CompileError> {
        let (table, diagnostics) = symtab::compile(&self.schema, mode, &self.config, &self.registry)?;
        self.mode = mode;
        self.table = table;
        self.diagnostics = diagnostics;
        Ok(())
    }

    pub fn mode(&self) -> WireMode {
        self.mode
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Warnings found while compiling
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.table
    }

    /// Converts a native value to its wire form as type `type_name`
    pub fn encode(&self, type_name: &str, value: &Value) -> CodecResult<Json> {
        let entry = self
            .table
            .entry(type_name)
            .ok_or_else(|| CodecError::undefined_type(type_name))?;
        encode::encode(self, entry, value)
    }

    /// Converts a wire value to its native form as type `type_name`
    pub fn decode(&self, type_name: &str, wire: &Json) -> CodecResult<Value> {
        let entry = self
            .table
            .entry(type_name)
            .ok_or_else(|| CodecError::undefined_type(type_name))?;
        decode::decode(self, entry, wire)
    }

    pub(crate) fn resolve(&self, type_ref: &TypeRef) -> CodecResult<&SymbolEntry> {
        match type_ref {
            TypeRef::Resolved(id) => Ok(self.table.get(*id)),
            TypeRef::Undefined(name) => Err(CodecError::undefined_type(name)),
        }
    }

    pub(crate) fn decode_ref(&self, type_ref: &TypeRef, wire: &Json) -> CodecResult<Value> {
        decode::decode(self, self.resolve(type_ref)?, wire)
    }

    pub(crate) fn encode_ref(&self, type_ref: &TypeRef, value: &Value) -> CodecResult<Json> {
        encode::encode(self, self.resolve(type_ref)?, value)
    }
}
