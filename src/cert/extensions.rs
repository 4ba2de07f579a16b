use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use const_oid::AssociatedOid;
use der::{Decode, oid::ObjectIdentifier};
use x509_cert::ext::pkix::name::GeneralName;

pub use der::flagset::FlagSet;
use x509_cert::ext::pkix::KeyUsage as X509KeyUsage;
pub use x509_cert::ext::pkix::KeyUsages;

use crate::error::CertGuardError;
use crate::parser::X509;

/// Trait for decoding X.509 extensions read from a parsed certificate.
///
/// # Example
/// ```
/// use certguard::cert::extensions::{BasicConstraints, FromX509Extension};
/// // SEQUENCE { BOOLEAN TRUE }
/// let bc = BasicConstraints::from_x509_extension_value(&[0x30, 0x03, 0x01, 0x01, 0xff]).unwrap();
/// assert!(bc.is_ca);
/// ```
pub trait FromX509Extension {
    /// The Object Identifier (OID) for the extension.
    const OID: ObjectIdentifier;

    /// Decodes the extension from a DER-encoded byte slice.
    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CertGuardError>
    where
        Self: Sized;
}

/// Looks up and decodes extension `E` in `cert`.
///
/// Returns `Ok(None)` when the certificate does not carry it.
pub fn find_extension<E: FromX509Extension>(cert: &X509) -> Result<Option<E>, CertGuardError> {
    cert.tbs_certificate
        .extensions
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|ext| ext.extn_id == E::OID)
        .map(|ext| E::from_x509_extension_value(ext.extn_value.as_bytes()))
        .transpose()
}

/// Represents the Subject Alternative Name (SAN) extension.
///
/// Only DNS names and IP addresses are kept; other general name forms are
/// ignored.
///
/// # Fields
/// * `dns_names` - DNS names, as encoded.
/// * `ip_addresses` - IPv4 and IPv6 addresses.
#[derive(Debug, Clone, Default)]
pub struct SubjectAltName {
    pub dns_names: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
}

impl FromX509Extension for SubjectAltName {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectAltName::OID;

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CertGuardError> {
        let san = x509_cert::ext::pkix::SubjectAltName::from_der(extension)?;
        let mut out = Self::default();
        for name in san.0.iter() {
            match name {
                GeneralName::DnsName(dns) => out.dns_names.push(dns.to_string()),
                GeneralName::IpAddress(ip) => {
                    out.ip_addresses.push(ip_from_bytes(ip.as_bytes())?)
                }
                _ => {}
            }
        }
        Ok(out)
    }
}

fn ip_from_bytes(bytes: &[u8]) -> Result<IpAddr, CertGuardError> {
    if let Ok(octets) = <[u8; 4]>::try_from(bytes) {
        Ok(IpAddr::V4(Ipv4Addr::from(octets)))
    } else if let Ok(octets) = <[u8; 16]>::try_from(bytes) {
        Ok(IpAddr::V6(Ipv6Addr::from(octets)))
    } else {
        Err(CertGuardError::DecodingError(format!(
            "IP address of {} bytes in subjectAltName",
            bytes.len()
        )))
    }
}

/// Represents the Basic Constraints extension.
///
/// This extension indicates whether the certificate is a CA certificate and its path length.
///
/// # Fields
/// * `is_ca` - Indicates if the certificate is a CA.
/// * `max_path_length` - The maximum number of intermediate CAs allowed.
#[derive(Debug, Default)]
pub struct BasicConstraints {
    pub is_ca: bool,
    pub max_path_length: Option<u32>,
}

impl FromX509Extension for BasicConstraints {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::BasicConstraints::OID;

    fn from_x509_extension_value(der_bytes: &[u8]) -> Result<Self, CertGuardError> {
        let bc = x509_cert::ext::pkix::BasicConstraints::from_der(der_bytes)?;
        Ok(Self {
            is_ca: bc.ca,
            max_path_length: bc.path_len_constraint.map(|v| v as u32),
        })
    }
}

/// Represents the Key Usage extension.
///
/// This extension defines the purpose of the key contained in the certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage(pub FlagSet<KeyUsages>);

impl KeyUsage {
    /// Whether the key may sign certificates.
    pub fn allows_cert_sign(&self) -> bool {
        self.0.contains(KeyUsages::KeyCertSign)
    }
}

impl FromX509Extension for KeyUsage {
    const OID: ObjectIdentifier = <X509KeyUsage as AssociatedOid>::OID;

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CertGuardError> {
        let ku = X509KeyUsage::from_der(extension)?;
        Ok(Self(ku.0))
    }
}
