use std::fmt;

/// Outcome of a policy check.
///
/// The discriminants are the OpenSSL `X509_V_*` codes, so results can be
/// logged or compared with tooling that speaks those numbers. Exactly one
/// value, [`VerifyResult::Ok`], means success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum VerifyResult {
    Ok = 0,
    UnableToDecodeIssuerPublicKey = 6,
    CertSignatureFailure = 7,
    CertNotYetValid = 9,
    CertHasExpired = 10,
    DepthZeroSelfSignedCert = 18,
    UnableToGetIssuerCertLocally = 20,
    CertChainTooLong = 22,
    InvalidCa = 24,
    /// The certificate could not be inspected (e.g. a malformed extension).
    ApplicationVerification = 50,
    HostnameMismatch = 62,
}

impl VerifyResult {
    /// Every result, in code order.
    pub const ALL: [VerifyResult; 11] = [
        VerifyResult::Ok,
        VerifyResult::UnableToDecodeIssuerPublicKey,
        VerifyResult::CertSignatureFailure,
        VerifyResult::CertNotYetValid,
        VerifyResult::CertHasExpired,
        VerifyResult::DepthZeroSelfSignedCert,
        VerifyResult::UnableToGetIssuerCertLocally,
        VerifyResult::CertChainTooLong,
        VerifyResult::InvalidCa,
        VerifyResult::ApplicationVerification,
        VerifyResult::HostnameMismatch,
    ];

    /// Numeric `X509_V_*` code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Looks up a result by its numeric code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.code() == code)
    }

    pub fn is_ok(self) -> bool {
        self == VerifyResult::Ok
    }
}

impl fmt::Display for VerifyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            VerifyResult::Ok => "ok",
            VerifyResult::UnableToDecodeIssuerPublicKey => "unable to decode issuer public key",
            VerifyResult::CertSignatureFailure => "certificate signature failure",
            VerifyResult::CertNotYetValid => "certificate is not yet valid",
            VerifyResult::CertHasExpired => "certificate has expired",
            VerifyResult::DepthZeroSelfSignedCert => "self-signed certificate",
            VerifyResult::UnableToGetIssuerCertLocally => "unable to get local issuer certificate",
            VerifyResult::CertChainTooLong => "certificate chain too long",
            VerifyResult::InvalidCa => "invalid CA certificate",
            VerifyResult::ApplicationVerification => "application verification failure",
            VerifyResult::HostnameMismatch => "hostname mismatch",
        };
        f.write_str(text)
    }
}
