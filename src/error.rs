//! use certguard::error::CertGuardError;

use thiserror::Error;

/// Represents errors that can occur in the CertGuard library.
///
/// Every constructor of [`crate::cert::Certificate`] either succeeds or
/// returns exactly one of these; verification outcomes are reported as
/// [`crate::policy::VerifyResult`] codes instead.
#[derive(Debug, Error, Clone)]
pub enum CertGuardError {
    /// No temporary storage could be allocated or written while
    /// materializing a stream.
    #[error("Failed to create temporary certificate file: {0}")]
    ResourceCreation(String),

    /// The certificate file could not be opened for reading.
    #[error("Failed to open {path}: {reason}")]
    ResourceNotFound { path: String, reason: String },

    /// Bytes were read but did not contain a valid certificate.
    #[error("Failed to load certificate from {location}: {reason}")]
    CertificateParse { location: String, reason: String },

    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// The signature or public key algorithm is not supported.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The issuer public key could not be decoded.
    #[error("Invalid public key: {0}")]
    InvalidKey(String),

    /// The signature does not verify under the given public key.
    #[error("Signature verification failed")]
    SignatureMismatch,

    /// I/O failure while writing a certificate.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<der::Error> for CertGuardError {
    /// Converts a `der::Error` into a `CertGuardError`.
    fn from(err: der::Error) -> Self {
        CertGuardError::DecodingError(err.to_string())
    }
}

impl From<std::io::Error> for CertGuardError {
    fn from(err: std::io::Error) -> Self {
        CertGuardError::Io(err.to_string())
    }
}
