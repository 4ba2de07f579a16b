use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use der::{Decode, Encode};
use tempfile::NamedTempFile;

use crate::error::CertGuardError;

pub type Result<T> = std::result::Result<T, CertGuardError>;

/// The parsed certificate structure wrapped by [`crate::cert::Certificate`].
pub type X509 = x509_cert::Certificate;

/// PEM labels accepted as a certificate block.
const CERTIFICATE_TAGS: &[&str] = &["CERTIFICATE", "X509 CERTIFICATE"];

/// Parses the first PEM certificate found in `reader`.
///
/// Blocks with other labels (private keys, parameters) are skipped.
pub fn parse_pem<R: Read>(reader: R) -> Result<X509> {
    parse_pem_at(reader, "input")
}

/// Parses every PEM certificate found in `reader`, in order.
pub fn parse_pem_bundle<R: Read>(mut reader: R) -> Result<Vec<X509>> {
    let location = "bundle";
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|e| parse_error(location, e.to_string()))?;

    let certs = pem::parse_many(&buf)
        .map_err(|e| parse_error(location, e.to_string()))?
        .iter()
        .filter(|block| CERTIFICATE_TAGS.contains(&block.tag()))
        .map(|block| X509::from_der(block.contents()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| parse_error(location, e.to_string()))?;

    if certs.is_empty() {
        return Err(parse_error(location, "no certificate found".to_string()));
    }
    Ok(certs)
}

/// Decodes a single DER certificate.
pub fn parse_der(der: &[u8]) -> Result<X509> {
    X509::from_der(der).map_err(|e| parse_error("input", e.to_string()))
}

/// Opens `path` for reading and parses one PEM certificate from it.
///
/// The file is closed on every exit path, including parse failures.
pub fn read_pem_file(path: &Path) -> Result<X509> {
    let file = open(path)?;
    parse_pem_at(BufReader::new(file), &path.display().to_string())
}

/// Opens `path` for reading and parses every PEM certificate in it.
pub fn read_pem_bundle(path: &Path) -> Result<Vec<X509>> {
    let file = open(path)?;
    parse_pem_bundle(BufReader::new(file)).map_err(|e| match e {
        CertGuardError::CertificateParse { reason, .. } => {
            parse_error(&path.display().to_string(), reason)
        }
        other => other,
    })
}

/// Copies `reader` into a freshly created, uniquely named temporary file.
///
/// The file is deleted when the returned handle is dropped.
pub fn materialize<R: Read>(mut reader: R) -> Result<NamedTempFile> {
    let mut file =
        NamedTempFile::new().map_err(|e| CertGuardError::ResourceCreation(e.to_string()))?;
    io::copy(&mut reader, &mut file)
        .and_then(|_| file.flush())
        .map_err(|e| CertGuardError::ResourceCreation(e.to_string()))?;
    Ok(file)
}

/// Encodes a certificate as DER.
pub fn encode_der(cert: &X509) -> Result<Vec<u8>> {
    cert.to_der()
        .map_err(|e| CertGuardError::EncodingError(e.to_string()))
}

/// Encodes a certificate as a PEM `CERTIFICATE` block.
pub fn encode_pem(cert: &X509) -> Result<String> {
    Ok(der_to_pem(&encode_der(cert)?, "CERTIFICATE"))
}

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(
        &pem,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| CertGuardError::ResourceNotFound {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn parse_pem_at<R: Read>(mut reader: R, location: &str) -> Result<X509> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|e| parse_error(location, e.to_string()))?;

    let blocks = pem::parse_many(&buf).map_err(|e| parse_error(location, e.to_string()))?;
    let block = blocks
        .iter()
        .find(|block| CERTIFICATE_TAGS.contains(&block.tag()))
        .ok_or_else(|| parse_error(location, "no certificate found".to_string()))?;

    X509::from_der(block.contents()).map_err(|e| parse_error(location, e.to_string()))
}

fn parse_error(location: &str, reason: String) -> CertGuardError {
    CertGuardError::CertificateParse {
        location: location.to_string(),
        reason,
    }
}
