//! Format functions
//!
//! Semantic checks and wire converters selected by a type's `format` option.

mod convert;
mod errors;
mod network;
mod registry;
mod validate;

pub use errors::{FormatError, FormatResult};
pub use registry::{
    BinToStr, Check, CheckFn, Converter, FormatFns, FormatRegistry, PartsToStr, StrToBin, StrToParts,
    DEFAULT_BINARY_FORMAT,
};
