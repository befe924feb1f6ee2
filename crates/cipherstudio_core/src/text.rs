//! Normalization for account fields and server hosts.

use std::net::IpAddr;

/// Trimmed value of an optional account field.
///
/// Login and registration treat a blank username or email the same as a
/// missing one, so whitespace-only input maps to `None`.
pub fn trimmed_field(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Key an email address is stored and looked up under.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Whether `host` names this machine.
///
/// Accepts `localhost` in any case and loopback IP literals, including IPv6
/// in URL brackets.
pub fn is_loopback_host(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    let literal = match host.strip_prefix('[') {
        Some(inner) => match inner.strip_suffix(']') {
            Some(inner) => inner,
            None => return false,
        },
        None => host,
    };
    matches!(literal.parse::<IpAddr>(), Ok(ip) if ip.is_loopback())
}
