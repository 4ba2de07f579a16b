pub mod hostname;
pub mod result;
pub mod signature;

use std::path::Path;

use bon::Builder;
use log::{debug, warn};
use time::OffsetDateTime;

pub use result::VerifyResult;

use crate::cert::extensions::{BasicConstraints, KeyUsage, find_extension};
use crate::cert::{Certificate, to_offset_date_time};
use crate::error::CertGuardError;
use crate::parser::{self, X509};

pub type Result<T> = std::result::Result<T, CertGuardError>;

/// Default maximum verification depth.
pub const DEFAULT_VERIFICATION_DEPTH: u32 = 9;

/// Evaluates a certificate against a host name under some trust policy.
///
/// The evaluator receives its own copy of the certificate and may consume
/// it; callers never hand over a certificate they still use.
pub trait PolicyEvaluator {
    /// Checks `cert` for `host_name`, returning [`VerifyResult::Ok`] on success.
    fn check(&self, cert: X509, host_name: &str) -> VerifyResult;
}

/// How much of the trust policy is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerificationMode {
    /// Only the host name is checked.
    None,
    /// Host name, validity period and issuance by a trust anchor.
    #[default]
    Relaxed,
    /// As `Relaxed`, and the issuing anchor must be a CA allowed to sign
    /// certificates.
    Strict,
}

/// Trust policy used to verify certificates.
///
/// # Fields
/// * `mode` - The enforcement level.
/// * `ca_certificates` - Trust anchors.
/// * `verification_depth` - Maximum issuance depth; `0` only accepts
///   certificates that are anchors themselves.
/// * `verify_time` - Instant at which validity is evaluated; now if unset.
///
/// # Example
/// ```
/// use certguard::policy::{Context, VerificationMode};
///
/// let context = Context::builder()
///     .mode(VerificationMode::Strict)
///     .verification_depth(1)
///     .build();
/// assert!(context.ca_certificates.is_empty());
/// ```
#[derive(Debug, Clone, Builder)]
pub struct Context {
    #[builder(default)]
    pub mode: VerificationMode,
    #[builder(default)]
    pub ca_certificates: Vec<X509>,
    #[builder(default = DEFAULT_VERIFICATION_DEPTH)]
    pub verification_depth: u32,
    pub verify_time: Option<OffsetDateTime>,
}

impl Default for Context {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Context {
    /// Adds every certificate of a PEM bundle to the trust anchors.
    ///
    /// # Returns
    /// The number of anchors added.
    pub fn load_ca_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let anchors = parser::read_pem_bundle(path)?;
        let count = anchors.len();
        self.ca_certificates.extend(anchors);
        debug!("loaded {} CA certificate(s) from {}", count, path.display());
        Ok(count)
    }

    /// Adds a single trust anchor.
    pub fn add_ca_certificate(&mut self, cert: &Certificate<'_>) {
        self.ca_certificates.push(cert.handle().clone());
    }

    fn evaluate(&self, cert: &X509, host_name: &str) -> VerifyResult {
        match hostname::matches(cert, host_name) {
            Ok(true) => {}
            Ok(false) => return VerifyResult::HostnameMismatch,
            Err(e) => {
                warn!("could not inspect certificate names: {e}");
                return VerifyResult::ApplicationVerification;
            }
        }

        if self.mode == VerificationMode::None {
            return VerifyResult::Ok;
        }

        let now = self.verify_time.unwrap_or_else(OffsetDateTime::now_utc);
        if let Some(failure) = validity_failure(cert, now) {
            return failure;
        }

        if self
            .ca_certificates
            .iter()
            .any(|anchor| same_certificate(anchor, cert))
        {
            return VerifyResult::Ok;
        }

        if self.verification_depth == 0 {
            return VerifyResult::CertChainTooLong;
        }

        let tbs = &cert.tbs_certificate;
        let mut result = if tbs.subject == tbs.issuer {
            VerifyResult::DepthZeroSelfSignedCert
        } else {
            VerifyResult::UnableToGetIssuerCertLocally
        };

        // Several anchors may share a subject (key rollover); any one suffices.
        for anchor in self
            .ca_certificates
            .iter()
            .filter(|anchor| anchor.tbs_certificate.subject == tbs.issuer)
        {
            result = self.check_issued_by(cert, anchor, now);
            if result.is_ok() {
                break;
            }
        }
        result
    }

    fn check_issued_by(&self, cert: &X509, anchor: &X509, now: OffsetDateTime) -> VerifyResult {
        if let Some(failure) = validity_failure(anchor, now) {
            return failure;
        }

        if self.mode == VerificationMode::Strict && !may_sign_certificates(anchor) {
            return VerifyResult::InvalidCa;
        }

        match signature::verify_signed_by(cert, &anchor.tbs_certificate.subject_public_key_info) {
            Ok(()) => VerifyResult::Ok,
            Err(CertGuardError::SignatureMismatch) => VerifyResult::CertSignatureFailure,
            Err(e) => {
                debug!("cannot check signature: {e}");
                VerifyResult::UnableToDecodeIssuerPublicKey
            }
        }
    }
}

impl PolicyEvaluator for Context {
    fn check(&self, cert: X509, host_name: &str) -> VerifyResult {
        let result = self.evaluate(&cert, host_name);
        if result.is_ok() {
            debug!("certificate verified for {host_name}");
        } else {
            debug!(
                "certificate rejected for {host_name}: {result} ({})",
                result.code()
            );
        }
        result
    }
}

fn validity_failure(cert: &X509, now: OffsetDateTime) -> Option<VerifyResult> {
    let validity = &cert.tbs_certificate.validity;
    if now < to_offset_date_time(&validity.not_before) {
        Some(VerifyResult::CertNotYetValid)
    } else if now > to_offset_date_time(&validity.not_after) {
        Some(VerifyResult::CertHasExpired)
    } else {
        None
    }
}

fn may_sign_certificates(anchor: &X509) -> bool {
    let is_ca = matches!(
        find_extension::<BasicConstraints>(anchor),
        Ok(Some(BasicConstraints { is_ca: true, .. }))
    );
    let key_usage_ok = match find_extension::<KeyUsage>(anchor) {
        Ok(Some(usage)) => usage.allows_cert_sign(),
        Ok(None) => true,
        Err(_) => false,
    };
    is_ca && key_usage_ok
}

fn same_certificate(a: &X509, b: &X509) -> bool {
    match (parser::encode_der(a), parser::encode_der(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
