//! Command-line front end
//!
//! Provides:
//! - validate: check instance files against a schema's exported types
//! - decode: wire value on stdin to native value on stdout
//! - encode: native value on stdin to wire value on stdout

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, ValueArgs};
pub use commands::{
    build_codec, decode_value, encode_value, run, run_command, validate_instances, Config, InstanceReport,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, read_value, write_error, write_response};
