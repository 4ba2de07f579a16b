pub mod extensions;
pub mod name;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::debug;
use time::OffsetDateTime;

use crate::error::CertGuardError;
use crate::parser::{self, X509};
use crate::policy::{PolicyEvaluator, VerifyResult, signature};
use extensions::{SubjectAltName, find_extension};

pub type Result<T> = std::result::Result<T, CertGuardError>;

/// Ownership of the parsed certificate behind a [`Certificate`].
///
/// Cloning follows the tag: an owned handle is duplicated so every copy can
/// be dropped independently, a borrowed handle is shared as-is.
#[derive(Debug, Clone)]
pub enum Handle<'a> {
    /// Loaded by this crate and released when the certificate is dropped.
    Owned(Box<X509>),
    /// Supplied by the caller, who keeps ownership.
    Borrowed(&'a X509),
}

impl Handle<'_> {
    /// Returns the parsed certificate.
    pub fn get(&self) -> &X509 {
        match self {
            Handle::Owned(cert) => cert.as_ref(),
            Handle::Borrowed(cert) => *cert,
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, Handle::Owned(_))
    }
}

/// Where the certificate material was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Read from a file given by the caller.
    File(PathBuf),
    /// Read from a stream through this temporary file, which is removed
    /// once loading finishes.
    Stream(PathBuf),
    /// Decoded from an in-memory buffer.
    Memory,
    /// Wraps a handle supplied by the caller.
    Handle,
}

/// Represents a parsed X.509 certificate and its identity attributes.
///
/// Issuer and subject names are rendered once at construction and never
/// change afterwards. A certificate either owns its parsed structure
/// (loaded from a path, stream or buffer) or borrows one from the caller
/// ([`Certificate::from_handle`]); see [`Handle`] for how copies behave.
///
/// # Example
/// ```rust,no_run
/// use certguard::cert::Certificate;
/// use certguard::policy::Context;
///
/// # fn main() -> Result<(), certguard::error::CertGuardError> {
/// let cert = Certificate::from_path("server.pem")?;
/// println!("issued by {}", cert.issuer_name());
///
/// let mut context = Context::default();
/// context.load_ca_file("ca.pem")?;
/// assert!(cert.verify("server.example.com", &context));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Certificate<'a> {
    issuer_name: String,
    subject_name: String,
    handle: Handle<'a>,
    origin: Origin,
}

impl Certificate<'static> {
    /// Loads a PEM certificate from a byte stream.
    ///
    /// The stream is first copied into a uniquely named temporary file,
    /// which is read back and parsed. The temporary file is removed before
    /// this returns, whether loading succeeded or not.
    ///
    /// # Errors
    /// * `ResourceCreation` - the temporary file could not be created or written.
    /// * `ResourceNotFound` - the temporary file could not be reopened.
    /// * `CertificateParse` - the stream holds no valid PEM certificate.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let temp = parser::materialize(reader)?;
        let path = temp.path().to_path_buf();
        let x509 = parser::read_pem_file(&path)?;
        let cert = Self::owned(x509, Origin::Stream(path));
        debug!("loaded certificate {} from stream", cert.subject_name);
        Ok(cert)
    }

    /// Loads a PEM certificate from a file.
    ///
    /// # Errors
    /// * `ResourceNotFound` - the path could not be opened.
    /// * `CertificateParse` - the file holds no valid PEM certificate.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let x509 = parser::read_pem_file(path)?;
        let cert = Self::owned(x509, Origin::File(path.to_path_buf()));
        debug!(
            "loaded certificate {} from {}",
            cert.subject_name,
            path.display()
        );
        Ok(cert)
    }

    /// Parses a PEM certificate held in memory.
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let x509 = parser::parse_pem(pem)?;
        Ok(Self::owned(x509, Origin::Memory))
    }

    /// Decodes a DER certificate held in memory.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let x509 = parser::parse_der(der)?;
        Ok(Self::owned(x509, Origin::Memory))
    }

    fn owned(x509: X509, origin: Origin) -> Self {
        Self::initialize(Handle::Owned(Box::new(x509)), origin)
    }
}

impl<'a> Certificate<'a> {
    /// Wraps a parsed certificate owned by the caller.
    ///
    /// Nothing is copied: the result and all of its clones refer to
    /// `handle`, and none of them release it.
    pub fn from_handle(handle: &'a X509) -> Self {
        Self::initialize(Handle::Borrowed(handle), Origin::Handle)
    }

    fn initialize(handle: Handle<'a>, origin: Origin) -> Self {
        let tbs = &handle.get().tbs_certificate;
        let issuer_name = name::oneline(&tbs.issuer);
        let subject_name = name::oneline(&tbs.subject);
        Self {
            issuer_name,
            subject_name,
            handle,
            origin,
        }
    }

    /// The issuer distinguished name in one-line form.
    pub fn issuer_name(&self) -> &str {
        &self.issuer_name
    }

    /// The subject distinguished name in one-line form.
    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    /// The parsed certificate.
    pub fn handle(&self) -> &X509 {
        self.handle.get()
    }

    /// Whether this certificate owns its parsed structure.
    pub fn is_owned(&self) -> bool {
        self.handle.is_owned()
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// The file this certificate was read from, if it was read from one.
    pub fn source_path(&self) -> Option<&Path> {
        match &self.origin {
            Origin::File(path) | Origin::Stream(path) => Some(path),
            Origin::Memory | Origin::Handle => None,
        }
    }

    /// Exchanges the contents of two certificates.
    pub fn swap(&mut self, other: &mut Certificate<'a>) {
        std::mem::swap(self, other);
    }

    /// Detaches this certificate from any borrowed handle.
    pub fn into_owned(self) -> Certificate<'static> {
        let handle = match self.handle {
            Handle::Owned(cert) => cert,
            Handle::Borrowed(cert) => Box::new(cert.clone()),
        };
        Certificate {
            issuer_name: self.issuer_name,
            subject_name: self.subject_name,
            handle: Handle::Owned(handle),
            origin: self.origin,
        }
    }

    /// Verifies this certificate for `host_name` under `policy`.
    ///
    /// Returns `true` only when the policy reports [`VerifyResult::Ok`].
    pub fn verify<P: PolicyEvaluator + ?Sized>(&self, host_name: &str, policy: &P) -> bool {
        self.verify_result(host_name, policy).is_ok()
    }

    /// Like [`Certificate::verify`], returning the policy's result code.
    ///
    /// The policy is handed a duplicate of the parsed certificate, never
    /// this certificate's own.
    pub fn verify_result<P: PolicyEvaluator + ?Sized>(
        &self,
        host_name: &str,
        policy: &P,
    ) -> VerifyResult {
        policy.check(self.handle().clone(), host_name)
    }

    /// Whether `issuer` names this certificate's issuer and its key
    /// verifies this certificate's signature.
    pub fn issued_by(&self, issuer: &Certificate<'_>) -> bool {
        let issuer_tbs = &issuer.handle().tbs_certificate;
        self.handle().tbs_certificate.issuer == issuer_tbs.subject
            && signature::verify_signed_by(self.handle(), &issuer_tbs.subject_public_key_info)
                .is_ok()
    }

    /// The subject common name (CN), if present.
    pub fn common_name(&self) -> Option<String> {
        name::find_attribute(&self.handle().tbs_certificate.subject, &name::COMMON_NAME)
    }

    /// DNS names listed in the subjectAltName extension.
    pub fn subject_alt_names(&self) -> Result<Vec<String>> {
        Ok(find_extension::<SubjectAltName>(self.handle())?
            .map(|san| san.dns_names)
            .unwrap_or_default())
    }

    /// The serial number as lowercase hex, without DER sign padding.
    pub fn serial_number(&self) -> String {
        serial_hex(self.handle().tbs_certificate.serial_number.as_bytes())
    }

    /// Start of the validity period.
    pub fn valid_from(&self) -> OffsetDateTime {
        to_offset_date_time(&self.handle().tbs_certificate.validity.not_before)
    }

    /// End of the validity period.
    pub fn expires_on(&self) -> OffsetDateTime {
        to_offset_date_time(&self.handle().tbs_certificate.validity.not_after)
    }

    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        parser::encode_der(self.handle())
    }

    /// Encodes the certificate into PEM format.
    pub fn to_pem(&self) -> Result<String> {
        parser::encode_pem(self.handle())
    }

    /// Writes the certificate to `path` in PEM format.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_pem()?)?;
        Ok(())
    }
}

impl PartialEq for Certificate<'_> {
    /// Certificates are equal when their encodings are.
    fn eq(&self, other: &Self) -> bool {
        match (self.to_der(), other.to_der()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

/// Hex-encodes big-endian integer content octets, dropping leading zero
/// bytes but keeping at least one.
fn serial_hex(bytes: &[u8]) -> String {
    let start = bytes
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(bytes.len().saturating_sub(1));
    bytes[start..].iter().map(|b| format!("{b:02x}")).collect()
}

pub(crate) fn to_offset_date_time(time: &x509_cert::time::Time) -> OffsetDateTime {
    match time {
        x509_cert::time::Time::UtcTime(ut) => OffsetDateTime::from(ut.to_system_time()),
        x509_cert::time::Time::GeneralTime(gt) => OffsetDateTime::from(gt.to_system_time()),
    }
}
