//! IP address and network formats
//!
//! Addresses travel as raw bytes (4 for IPv4, 16 for IPv6) and are shown as dotted
//! quad or RFC 5952 text. Networks are two-part wire arrays
//! `[base64url(address), prefix]` shown as `"addr/prefix"`.

use std::net::{Ipv4Addr, Ipv6Addr};

use serde_json::Value as Json;

use super::convert::{b2s_base64url, s2b_base64url};
use super::errors::{FormatError, FormatResult};
use crate::value::Value;

fn ipv4_octets(bytes: &[u8]) -> FormatResult<[u8; 4]> {
    bytes
        .try_into()
        .map_err(|_| FormatError::invalid(format!("IPv4 address must be 4 bytes, got {}", bytes.len())))
}

fn ipv6_octets(bytes: &[u8]) -> FormatResult<[u8; 16]> {
    bytes
        .try_into()
        .map_err(|_| FormatError::invalid(format!("IPv6 address must be 16 bytes, got {}", bytes.len())))
}

pub fn b2s_ipv4_addr(bytes: &[u8]) -> FormatResult<String> {
    Ok(Ipv4Addr::from(ipv4_octets(bytes)?).to_string())
}

pub fn s2b_ipv4_addr(text: &str) -> FormatResult<Vec<u8>> {
    text.parse::<Ipv4Addr>()
        .map(|a| a.octets().to_vec())
        .map_err(|_| FormatError::invalid(format!("invalid IPv4 address {:?}", text)))
}

pub fn b2s_ipv6_addr(bytes: &[u8]) -> FormatResult<String> {
    Ok(Ipv6Addr::from(ipv6_octets(bytes)?).to_string())
}

pub fn s2b_ipv6_addr(text: &str) -> FormatResult<Vec<u8>> {
    text.parse::<Ipv6Addr>()
        .map(|a| a.octets().to_vec())
        .map_err(|_| FormatError::invalid(format!("invalid IPv6 address {:?}", text)))
}

/// Either address family, chosen by length
pub fn b2s_ip_addr(bytes: &[u8]) -> FormatResult<String> {
    if bytes.len() > 4 {
        b2s_ipv6_addr(bytes)
    } else {
        b2s_ipv4_addr(bytes)
    }
}

/// Either address family, chosen by the presence of `:`
pub fn s2b_ip_addr(text: &str) -> FormatResult<Vec<u8>> {
    if text.contains(':') {
        s2b_ipv6_addr(text)
    } else {
        s2b_ipv4_addr(text)
    }
}

fn binary_len(value: &Value, allowed: &[usize], what: &str) -> FormatResult<()> {
    match value {
        Value::Binary(bytes) if allowed.contains(&bytes.len()) => Ok(()),
        Value::Binary(bytes) => Err(FormatError::invalid(format!(
            "{} must be {} bytes, got {}",
            what,
            allowed
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(" or "),
            bytes.len()
        ))),
        other => Err(FormatError::Unsupported {
            actual: other.type_name(),
        }),
    }
}

pub fn check_ip_addr(value: &Value) -> FormatResult<()> {
    binary_len(value, &[4, 16], "IP address")
}

pub fn check_ipv4_addr(value: &Value) -> FormatResult<()> {
    binary_len(value, &[4], "IPv4 address")
}

pub fn check_ipv6_addr(value: &Value) -> FormatResult<()> {
    binary_len(value, &[16], "IPv6 address")
}

pub fn check_mac_addr(value: &Value) -> FormatResult<()> {
    binary_len(value, &[6, 8], "MAC address")
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Family {
    V4,
    V6,
    Any,
}

fn split_net(text: &str) -> FormatResult<(&str, u8)> {
    let (addr, prefix) = text
        .split_once('/')
        .ok_or_else(|| FormatError::invalid(format!("network {:?} has no prefix length", text)))?;
    let prefix = prefix
        .parse::<u8>()
        .map_err(|_| FormatError::invalid(format!("invalid prefix length in {:?}", text)))?;
    Ok((addr, prefix))
}

fn check_prefix(prefix: u64, is_v6: bool) -> FormatResult<u8> {
    let limit = if is_v6 { 128 } else { 32 };
    if prefix > limit {
        return Err(FormatError::invalid(format!(
            "prefix length {} exceeds {}",
            prefix, limit
        )));
    }
    Ok(prefix as u8)
}

fn net_to_parts(text: &str, family: Family) -> FormatResult<Vec<Json>> {
    let (addr, prefix) = split_net(text)?;
    let bytes = match family {
        Family::V4 => s2b_ipv4_addr(addr)?,
        Family::V6 => s2b_ipv6_addr(addr)?,
        Family::Any => s2b_ip_addr(addr)?,
    };
    let prefix = check_prefix(u64::from(prefix), bytes.len() == 16)?;
    Ok(vec![Json::String(b2s_base64url(&bytes)?), Json::from(prefix)])
}

fn parts_to_net(parts: &[Json], family: Family) -> FormatResult<String> {
    let (addr, prefix) = match parts {
        [Json::String(addr), prefix] => (addr, prefix),
        _ => {
            return Err(FormatError::invalid(
                "network must be [base64url address, prefix length]",
            ))
        }
    };
    let prefix = prefix
        .as_u64()
        .ok_or_else(|| FormatError::invalid(format!("invalid prefix length {}", prefix)))?;
    let bytes = s2b_base64url(addr)?;
    let addr = match family {
        Family::V4 => b2s_ipv4_addr(&bytes)?,
        Family::V6 => b2s_ipv6_addr(&bytes)?,
        Family::Any => b2s_ip_addr(&bytes)?,
    };
    let prefix = check_prefix(prefix, bytes.len() == 16)?;
    Ok(format!("{}/{}", addr, prefix))
}

pub fn a2s_ip_net(parts: &[Json]) -> FormatResult<String> {
    parts_to_net(parts, Family::Any)
}

pub fn s2a_ip_net(text: &str) -> FormatResult<Vec<Json>> {
    net_to_parts(text, Family::Any)
}

pub fn a2s_ipv4_net(parts: &[Json]) -> FormatResult<String> {
    parts_to_net(parts, Family::V4)
}

pub fn s2a_ipv4_net(text: &str) -> FormatResult<Vec<Json>> {
    net_to_parts(text, Family::V4)
}

pub fn a2s_ipv6_net(parts: &[Json]) -> FormatResult<String> {
    parts_to_net(parts, Family::V6)
}

pub fn s2a_ipv6_net(text: &str) -> FormatResult<Vec<Json>> {
    net_to_parts(text, Family::V6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ipv4_text_roundtrip() {
        let bytes = s2b_ipv4_addr("192.168.1.10").unwrap();
        assert_eq!(bytes, vec![192, 168, 1, 10]);
        assert_eq!(b2s_ipv4_addr(&bytes).unwrap(), "192.168.1.10");
        assert!(s2b_ipv4_addr("192.168.1").is_err());
        assert!(b2s_ipv4_addr(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_ipv6_compressed_text() {
        let bytes = s2b_ipv6_addr("2001:0db8:0000:0000:0000:0000:0000:0001").unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(b2s_ipv6_addr(&bytes).unwrap(), "2001:db8::1");
    }

    #[test]
    fn test_ip_addr_picks_family() {
        assert_eq!(s2b_ip_addr("10.0.0.1").unwrap().len(), 4);
        assert_eq!(s2b_ip_addr("::1").unwrap().len(), 16);
        assert_eq!(b2s_ip_addr(&s2b_ip_addr("::1").unwrap()).unwrap(), "::1");
    }

    #[test]
    fn test_ip_addr_length_check() {
        assert!(check_ip_addr(&Value::binary(vec![0; 4])).is_ok());
        assert!(check_ip_addr(&Value::binary(vec![0; 16])).is_ok());
        let err = check_ip_addr(&Value::binary(vec![0; 5])).unwrap_err();
        assert!(err.to_string().contains("4 or 16"));
        assert!(check_ipv4_addr(&Value::binary(vec![0; 16])).is_err());
        assert!(check_ipv6_addr(&Value::binary(vec![0; 16])).is_ok());
    }

    #[test]
    fn test_mac_addr_lengths() {
        assert!(check_mac_addr(&Value::binary(vec![0; 6])).is_ok());
        assert!(check_mac_addr(&Value::binary(vec![0; 8])).is_ok());
        assert!(check_mac_addr(&Value::binary(vec![0; 7])).is_err());
        assert_eq!(
            check_mac_addr(&Value::from("aa:bb")),
            Err(FormatError::Unsupported { actual: "string" })
        );
    }

    #[test]
    fn test_ipv4_net_parts() {
        let parts = s2a_ipv4_net("192.168.0.0/24").unwrap();
        assert_eq!(parts, vec![json!("wKgAAA"), json!(24)]);
        assert_eq!(a2s_ipv4_net(&parts).unwrap(), "192.168.0.0/24");
    }

    #[test]
    fn test_net_prefix_bounds() {
        assert!(s2a_ipv4_net("10.0.0.0/32").is_ok());
        assert!(s2a_ipv4_net("10.0.0.0/33").is_err());
        assert!(s2a_ipv6_net("fe80::/128").is_ok());
        assert!(s2a_ipv6_net("fe80::/129").is_err());
        assert!(a2s_ipv4_net(&[json!("CgAAAA"), json!(40)]).is_err());
    }

    #[test]
    fn test_ip_net_either_family() {
        let parts = s2a_ip_net("2001:db8::/32").unwrap();
        assert_eq!(a2s_ip_net(&parts).unwrap(), "2001:db8::/32");
        assert!(s2a_ip_net("10.1.2.3").is_err());
        assert!(a2s_ip_net(&[json!("CgAAAA")]).is_err());
    }
}
