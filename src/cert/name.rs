use std::fmt::Write;

use const_oid::ObjectIdentifier;
use der::{Any, Tag, Tagged};
use x509_cert::name::Name;

/// Common Name (CN) attribute type.
pub const COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");

/// Short names used by the one-line rendering, keyed by attribute type.
const SHORT_NAMES: &[(ObjectIdentifier, &str)] = &[
    (COMMON_NAME, "CN"),
    (ObjectIdentifier::new_unwrap("2.5.4.4"), "SN"),
    (ObjectIdentifier::new_unwrap("2.5.4.5"), "serialNumber"),
    (ObjectIdentifier::new_unwrap("2.5.4.6"), "C"),
    (ObjectIdentifier::new_unwrap("2.5.4.7"), "L"),
    (ObjectIdentifier::new_unwrap("2.5.4.8"), "ST"),
    (ObjectIdentifier::new_unwrap("2.5.4.9"), "street"),
    (ObjectIdentifier::new_unwrap("2.5.4.10"), "O"),
    (ObjectIdentifier::new_unwrap("2.5.4.11"), "OU"),
    (ObjectIdentifier::new_unwrap("2.5.4.12"), "title"),
    (ObjectIdentifier::new_unwrap("2.5.4.15"), "businessCategory"),
    (ObjectIdentifier::new_unwrap("2.5.4.17"), "postalCode"),
    (ObjectIdentifier::new_unwrap("2.5.4.42"), "GN"),
    (ObjectIdentifier::new_unwrap("2.5.4.43"), "initials"),
    (ObjectIdentifier::new_unwrap("2.5.4.44"), "generationQualifier"),
    (ObjectIdentifier::new_unwrap("2.5.4.46"), "dnQualifier"),
    (ObjectIdentifier::new_unwrap("2.5.4.65"), "pseudonym"),
    (ObjectIdentifier::new_unwrap("2.5.4.97"), "organizationIdentifier"),
    (ObjectIdentifier::new_unwrap("1.3.6.1.4.1.311.60.2.1.1"), "jurisdictionL"),
    (ObjectIdentifier::new_unwrap("1.3.6.1.4.1.311.60.2.1.2"), "jurisdictionST"),
    (ObjectIdentifier::new_unwrap("1.3.6.1.4.1.311.60.2.1.3"), "jurisdictionC"),
    (ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.1"), "emailAddress"),
    (ObjectIdentifier::new_unwrap("0.9.2342.19200300.100.1.1"), "UID"),
    (ObjectIdentifier::new_unwrap("0.9.2342.19200300.100.1.25"), "DC"),
];

/// Renders a distinguished name in the classic one-line form,
/// e.g. `/C=US/O=Example Corp/CN=example.com`.
///
/// Every attribute of every RDN becomes one `/type=value` segment, in
/// encoding order. Attribute types without a short name are written as
/// dotted OIDs. Value bytes outside printable ASCII are escaped as `\xHH`.
pub fn oneline(name: &Name) -> String {
    let mut out = String::new();
    for rdn in name.0.iter() {
        for attr in rdn.0.iter() {
            out.push('/');
            match short_name(&attr.oid) {
                Some(sn) => out.push_str(sn),
                None => out.push_str(&attr.oid.to_string()),
            }
            out.push('=');
            write_value(&mut out, &attr.value);
        }
    }
    out
}

/// Returns the first value of the given attribute type as text.
pub fn find_attribute(name: &Name, oid: &ObjectIdentifier) -> Option<String> {
    name.0
        .iter()
        .flat_map(|rdn| rdn.0.iter())
        .find(|attr| attr.oid == *oid)
        .map(|attr| String::from_utf8_lossy(&value_bytes(&attr.value)).into_owned())
}

fn short_name(oid: &ObjectIdentifier) -> Option<&'static str> {
    SHORT_NAMES
        .iter()
        .find(|(known, _)| known == oid)
        .map(|(_, sn)| *sn)
}

/// Raw text bytes of an attribute value. BMPString is decoded from
/// UTF-16BE to UTF-8, a trailing odd byte becoming U+FFFD; every other
/// string type is taken as-is.
fn value_bytes(value: &Any) -> Vec<u8> {
    match value.tag() {
        Tag::BmpString => {
            let (mut text, trailing) = decode_bmp(value.value());
            if !trailing.is_empty() {
                text.push(char::REPLACEMENT_CHARACTER);
            }
            text.into_bytes()
        }
        _ => value.value().to_vec(),
    }
}

/// Writes an attribute value escaped for the one-line form. A trailing odd
/// byte of a BMPString is kept as `\xHH`.
fn write_value(out: &mut String, value: &Any) {
    match value.tag() {
        Tag::BmpString => {
            let (text, trailing) = decode_bmp(value.value());
            escape_into(out, text.as_bytes());
            for b in trailing {
                let _ = write!(out, "\\x{b:02X}");
            }
        }
        _ => escape_into(out, value.value()),
    }
}

/// Decodes UTF-16BE code units, returning the text and any odd byte left over.
fn decode_bmp(bytes: &[u8]) -> (String, &[u8]) {
    let chunks = bytes.chunks_exact(2);
    let trailing = chunks.remainder();
    let units: Vec<u16> = chunks
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    (String::from_utf16_lossy(&units), trailing)
}

fn escape_into(out: &mut String, bytes: &[u8]) {
    for &b in bytes {
        if (0x20..=0x7e).contains(&b) {
            out.push(b as char);
        } else {
            // Writing to a String cannot fail.
            let _ = write!(out, "\\x{b:02X}");
        }
    }
}
