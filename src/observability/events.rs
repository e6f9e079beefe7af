//! Events logged by the command-line front end
//!
//! The codec library itself never logs; every event here is raised by `cli`.

use std::fmt;

use super::logger::Severity;

/// Observable CLI events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Setup
    /// Configuration file loaded
    ConfigLoaded,
    /// Schema document parsed
    SchemaLoaded,
    /// Schema compiled into a codec
    SchemaCompiled,
    /// Schema rejected by the compiler
    SchemaRejected,
    /// Warning left by the compiler
    CompileWarning,

    // Values
    /// Instance accepted by at least one type
    InstanceValid,
    /// Instance accepted by no type
    InstanceInvalid,
    /// Value decoded
    DecodeComplete,
    /// Value encoded
    EncodeComplete,
    /// Encode or decode failed
    CodecFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemaLoaded => "SCHEMA_LOADED",
            Event::SchemaCompiled => "SCHEMA_COMPILED",
            Event::SchemaRejected => "SCHEMA_REJECTED",
            Event::CompileWarning => "COMPILE_WARNING",
            Event::InstanceValid => "INSTANCE_VALID",
            Event::InstanceInvalid => "INSTANCE_INVALID",
            Event::DecodeComplete => "DECODE_COMPLETE",
            Event::EncodeComplete => "ENCODE_COMPLETE",
            Event::CodecFailed => "CODEC_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::SchemaRejected | Event::CodecFailed | Event::InstanceInvalid => Severity::Error,
            Event::CompileWarning => Severity::Warn,
            Event::DecodeComplete | Event::EncodeComplete => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
