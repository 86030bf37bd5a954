//! Argument checks applied before a request is built.

use crate::error::ClientError;
use ipnet::IpNet;
use regex::Regex;
use std::net::IpAddr;
use std::sync::OnceLock;

/// Highest reputation the service stores.
pub const MAX_REPUTATION: u8 = 100;

/// Accepts a single IP literal or a CIDR range.
pub fn is_valid_ip_or_cidr(s: &str) -> bool {
    s.parse::<IpAddr>().is_ok() || s.parse::<IpNet>().is_ok()
}

pub fn is_valid_reputation(reputation: u8) -> bool {
    reputation <= MAX_REPUTATION
}

/// A violation name needs at least one word character or colon somewhere;
/// everything else is left to the service.
pub fn is_valid_violation_name(name: &str) -> bool {
    static VIOLATION_RE: OnceLock<Regex> = OnceLock::new();
    let re = VIOLATION_RE.get_or_init(|| Regex::new(r"[:\w]").expect("static regex"));
    re.is_match(name)
}

pub(crate) fn check_ip(ip: &str) -> Result<(), ClientError> {
    if is_valid_ip_or_cidr(ip) {
        Ok(())
    } else {
        Err(ClientError::invalid_argument(
            "ip",
            format!("{:?} is not an IP address or CIDR range", ip),
        ))
    }
}

pub(crate) fn check_reputation(reputation: u8) -> Result<(), ClientError> {
    if is_valid_reputation(reputation) {
        Ok(())
    } else {
        Err(ClientError::invalid_argument(
            "reputation",
            format!("{} is outside 0..={}", reputation, MAX_REPUTATION),
        ))
    }
}

pub(crate) fn check_violation(name: &str) -> Result<(), ClientError> {
    if is_valid_violation_name(name) {
        Ok(())
    } else {
        Err(ClientError::invalid_argument(
            "violation_type",
            format!("{:?} is not a valid violation name", name),
        ))
    }
}
