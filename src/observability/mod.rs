//! Observability for the command-line front end
//!
//! Structured JSON logs on stderr, one line per event, filtered by a minimum
//! severity. The codec library does not log; the CLI reports what it did.
//!
//! # Usage
//!
//! ```ignore
//! use jadn_codec::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::SchemaCompiled, &[("types", "12")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // This just verifies no panic
        log_event(Event::ConfigLoaded);
        log_event_with_fields(Event::SchemaLoaded, &[("path", "/tmp/schema.jadn")]);
    }
}
