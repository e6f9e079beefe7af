//! Semantic checks for String and Integer formats

use std::sync::OnceLock;

use regex::Regex;

use super::errors::{FormatError, FormatResult};
use crate::value::Value;

// RFC 5322 section 3.4.1 addr-spec, anchored at both ends.
const EMAIL_PATTERN: &str = r#"(?i)^(?:(?:[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")@(?:(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?|\[(?:(?:(2(5[0-5]|[0-4][0-9])|1[0-9][0-9]|[1-9]?[0-9]))\.){3}(?:(2(5[0-5]|[0-4][0-9])|1[0-9][0-9]|[1-9]?[0-9])|[a-z0-9-]*[a-z0-9]:(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\]))$"#;

static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();

fn text(value: &Value) -> FormatResult<&str> {
    value.as_str().ok_or(FormatError::Unsupported {
        actual: value.type_name(),
    })
}

fn valid_label(label: &str) -> bool {
    (1..=63).contains(&label.len())
        && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        && !label.starts_with('-')
        && !label.ends_with('-')
}

/// Host name per RFC 1034 section 3.1, one trailing dot allowed
pub fn check_hostname(value: &Value) -> FormatResult<()> {
    let name = text(value)?;
    if name.is_empty() || name.len() > 255 {
        return Err(FormatError::invalid(format!(
            "hostname length {} outside 1..255",
            name.len()
        )));
    }
    let stripped = name.strip_suffix('.').unwrap_or(name);
    match stripped.split('.').find(|label| !valid_label(label)) {
        Some(label) => Err(FormatError::invalid(format!("invalid hostname label {:?}", label))),
        None => Ok(()),
    }
}

/// Email address per RFC 5322 section 3.4.1
pub fn check_email(value: &Value) -> FormatResult<()> {
    let address = text(value)?;
    let regex = EMAIL
        .get_or_init(|| Regex::new(EMAIL_PATTERN).ok())
        .as_ref()
        .ok_or_else(|| FormatError::invalid("email pattern unavailable"))?;
    if regex.is_match(address) {
        Ok(())
    } else {
        Err(FormatError::invalid(format!("invalid email address {:?}", address)))
    }
}

/// URI with a scheme and an authority
pub fn check_uri(value: &Value) -> FormatResult<()> {
    let uri = text(value)?;
    let parsed = url::Url::parse(uri).map_err(|e| FormatError::invalid(format!("invalid URI {:?}: {}", uri, e)))?;
    if parsed.has_host() {
        Ok(())
    } else {
        Err(FormatError::invalid(format!("URI {:?} has no authority", uri)))
    }
}

fn check_width(value: &Value, min: i64, max: i64, name: &str) -> FormatResult<()> {
    match value {
        Value::Integer(i) if (min..=max).contains(i) => Ok(()),
        Value::Integer(i) => Err(FormatError::invalid(format!("{} out of range for {}", i, name))),
        other => Err(FormatError::Unsupported {
            actual: other.type_name(),
        }),
    }
}

pub fn check_i8(value: &Value) -> FormatResult<()> {
    check_width(value, i64::from(i8::MIN), i64::from(i8::MAX), "i8")
}

pub fn check_i16(value: &Value) -> FormatResult<()> {
    check_width(value, i64::from(i16::MIN), i64::from(i16::MAX), "i16")
}

pub fn check_i32(value: &Value) -> FormatResult<()> {
    check_width(value, i64::from(i32::MIN), i64::from(i32::MAX), "i32")
}

pub fn check_u8(value: &Value) -> FormatResult<()> {
    check_width(value, 0, i64::from(u8::MAX), "u8")
}

pub fn check_u16(value: &Value) -> FormatResult<()> {
    check_width(value, 0, i64::from(u16::MAX), "u16")
}

pub fn check_u32(value: &Value) -> FormatResult<()> {
    check_width(value, 0, i64::from(u32::MAX), "u32")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname() {
        assert!(check_hostname(&"a.b-c.example".into()).is_ok());
        assert!(check_hostname(&"example.com.".into()).is_ok());
        assert!(check_hostname(&"-bad.example".into()).is_err());
        assert!(check_hostname(&"bad-.example".into()).is_err());
        assert!(check_hostname(&"a..b".into()).is_err());
        assert!(check_hostname(&"under_score.example".into()).is_err());
        assert!(check_hostname(&"".into()).is_err());
    }

    #[test]
    fn test_hostname_length_limits() {
        let label = "a".repeat(63);
        assert!(check_hostname(&label.as_str().into()).is_ok());
        assert!(check_hostname(&format!("{}a", label).into()).is_err());

        let long = vec!["abc"; 64].join(".");
        assert_eq!(long.len(), 255);
        assert!(check_hostname(&long.as_str().into()).is_ok());
        assert!(check_hostname(&format!("{}x", long).into()).is_err());
    }

    #[test]
    fn test_email() {
        assert!(check_email(&"user@example.com".into()).is_ok());
        assert!(check_email(&"First.Last+tag@Sub.Example.org".into()).is_ok());
        assert!(check_email(&"user@[192.168.0.1]".into()).is_ok());
        assert!(check_email(&"user@".into()).is_err());
        assert!(check_email(&"no-at-sign".into()).is_err());
        assert!(check_email(&"user@example.com trailing".into()).is_err());
    }

    #[test]
    fn test_uri() {
        assert!(check_uri(&"https://example.com".into()).is_ok());
        assert!(check_uri(&"http://example.com/a/b?q=1".into()).is_ok());
        assert!(check_uri(&"mailto:user@example.com".into()).is_err());
        assert!(check_uri(&"/relative/path".into()).is_err());
    }

    #[test]
    fn test_integer_widths() {
        assert!(check_i8(&Value::Integer(-128)).is_ok());
        assert!(check_i8(&Value::Integer(128)).is_err());
        assert!(check_u8(&Value::Integer(255)).is_ok());
        assert!(check_u8(&Value::Integer(-1)).is_err());
        assert!(check_u32(&Value::Integer(4_294_967_295)).is_ok());
        assert!(check_i32(&Value::Integer(i64::from(i32::MAX) + 1)).is_err());
        assert!(check_u16(&Value::from("1")).is_err());
    }

    #[test]
    fn test_wrong_value_kind() {
        assert_eq!(
            check_hostname(&Value::Integer(1)),
            Err(FormatError::Unsupported { actual: "integer" })
        );
    }
}
