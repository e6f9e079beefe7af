//! JSON I/O handling for CLI
//!
//! - Input: one JSON value via stdin
//! - Output: one JSON object per response via stdout
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Read one JSON value from stdin
pub fn read_request() -> CliResult<Value> {
    read_value(io::stdin().lock())
}

/// Read one JSON value from any reader
pub fn read_value<R: Read>(mut reader: R) -> CliResult<Value> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    if content.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    Ok(serde_json::from_str(&content)?)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_response_to(&mut io::stdout(), data)
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_error_to(&mut io::stdout(), code, message)
}

pub fn write_response_to<W: Write>(writer: &mut W, data: Value) -> CliResult<()> {
    write_line(writer, &json!({"status": "ok", "data": data}))
}

pub fn write_error_to<W: Write>(writer: &mut W, code: &str, message: &str) -> CliResult<()> {
    write_line(writer, &json!({"status": "error", "code": code, "message": message}))
}

fn write_line<W: Write>(writer: &mut W, response: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, response)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_value_spanning_lines() {
        let value = read_value("{\n  \"x\": 1\n}\n".as_bytes()).unwrap();
        assert_eq!(value, json!({"x": 1}));
        assert!(read_value("   \n".as_bytes()).is_err());
    }

    #[test]
    fn test_response_shapes() {
        let mut out = Vec::new();
        write_response_to(&mut out, json!([1, 2])).unwrap();
        write_error_to(&mut out, "JADN_TYPE_MISMATCH", "bad").unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines[0], json!({"status": "ok", "data": [1, 2]}));
        assert_eq!(lines[1]["status"], "error");
        assert_eq!(lines[1]["code"], "JADN_TYPE_MISMATCH");
    }
}
