use std::net::IpAddr;

use crate::cert::extensions::{SubjectAltName, find_extension};
use crate::cert::name::{self, COMMON_NAME};
use crate::error::CertGuardError;
use crate::parser::X509;

/// Checks whether `cert` is valid for `host_name`.
///
/// IP literals are compared against subjectAltName IP entries only. DNS
/// names are matched against subjectAltName DNS entries; the subject CN is
/// consulted only when the certificate carries no DNS entries at all.
pub fn matches(cert: &X509, host_name: &str) -> Result<bool, CertGuardError> {
    let host = host_name.trim_end_matches('.');
    if host.is_empty() {
        return Ok(false);
    }

    let san = find_extension::<SubjectAltName>(cert)?.unwrap_or_default();

    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(san.ip_addresses.contains(&ip));
    }

    if !san.dns_names.is_empty() {
        return Ok(san
            .dns_names
            .iter()
            .any(|pattern| dns_name_matches(pattern, host)));
    }

    Ok(name::find_attribute(&cert.tbs_certificate.subject, &COMMON_NAME)
        .is_some_and(|cn| dns_name_matches(&cn, host)))
}

/// Matches a presented DNS name against a reference host name.
///
/// Comparison is ASCII case-insensitive. A wildcard is honoured only as the
/// whole leftmost label (`*.example.com`), matches exactly one non-empty
/// label, and needs at least two labels after it.
pub fn dns_name_matches(pattern: &str, host: &str) -> bool {
    let pattern = pattern.trim_end_matches('.');
    let host = host.trim_end_matches('.');

    match pattern.strip_prefix("*.") {
        Some(suffix) => {
            if !suffix.contains('.') || suffix.contains('*') {
                return false;
            }
            match host.split_once('.') {
                Some((label, rest)) => !label.is_empty() && rest.eq_ignore_ascii_case(suffix),
                None => false,
            }
        }
        None => !pattern.contains('*') && pattern.eq_ignore_ascii_case(host),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_is_case_insensitive() {
        assert!(dns_name_matches("Server.MyCA.local", "server.myca.local"));
        assert!(dns_name_matches("server.myca.local.", "server.myca.local"));
        assert!(!dns_name_matches("server.myca.local", "other.myca.local"));
    }

    #[test]
    fn test_wildcard_matches_one_label() {
        assert!(dns_name_matches("*.example.com", "www.example.com"));
        assert!(dns_name_matches("*.example.com", "API.Example.com"));
        assert!(!dns_name_matches("*.example.com", "a.b.example.com"));
        assert!(!dns_name_matches("*.example.com", "example.com"));
        assert!(!dns_name_matches("*.example.com", ".example.com"));
    }

    #[test]
    fn test_wildcard_rules() {
        assert!(!dns_name_matches("*.com", "example.com"));
        assert!(!dns_name_matches("w*.example.com", "www.example.com"));
        assert!(!dns_name_matches("www.*.com", "www.example.com"));
        assert!(!dns_name_matches("*", "localhost"));
    }
}
