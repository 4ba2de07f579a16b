use const_oid::{AssociatedOid, ObjectIdentifier};
use der::Encode;
use ecdsa::signature::Verifier;
use ecdsa::signature::hazmat::PrehashVerifier;
use pkcs8::DecodePublicKey;
use rsa::RsaPublicKey;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::error::CertGuardError;
use crate::parser::X509;

type Result<T> = std::result::Result<T, CertGuardError>;

const RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const ID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const ID_ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

const SECP256R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const SECP384R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
const SECP521R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.35");

const SHA1_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.5");
const SHA256_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
const SHA384_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12");
const SHA512_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.13");
const ECDSA_WITH_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");
const ECDSA_WITH_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.3");
const ECDSA_WITH_SHA512: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.4");

/// Represents the signature algorithms a certificate can be checked with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// SHA-1 with RSA encryption (PKCS#1 v1.5).
    Sha1WithRSA,
    /// SHA-256 with RSA encryption (PKCS#1 v1.5).
    Sha256WithRSA,
    /// SHA-384 with RSA encryption (PKCS#1 v1.5).
    Sha384WithRSA,
    /// SHA-512 with RSA encryption (PKCS#1 v1.5).
    Sha512WithRSA,
    /// SHA-256 with ECDSA.
    Sha256WithECDSA,
    /// SHA-384 with ECDSA.
    Sha384WithECDSA,
    /// SHA-512 with ECDSA.
    Sha512WithECDSA,
    /// EdDSA over Ed25519.
    Ed25519,
}

impl TryFrom<&AlgorithmIdentifierOwned> for SignatureAlgorithm {
    type Error = CertGuardError;

    /// Maps a certificate's `signatureAlgorithm` to a supported algorithm.
    fn try_from(value: &AlgorithmIdentifierOwned) -> Result<Self> {
        match value.oid {
            SHA1_WITH_RSA => Ok(SignatureAlgorithm::Sha1WithRSA),
            SHA256_WITH_RSA => Ok(SignatureAlgorithm::Sha256WithRSA),
            SHA384_WITH_RSA => Ok(SignatureAlgorithm::Sha384WithRSA),
            SHA512_WITH_RSA => Ok(SignatureAlgorithm::Sha512WithRSA),
            ECDSA_WITH_SHA256 => Ok(SignatureAlgorithm::Sha256WithECDSA),
            ECDSA_WITH_SHA384 => Ok(SignatureAlgorithm::Sha384WithECDSA),
            ECDSA_WITH_SHA512 => Ok(SignatureAlgorithm::Sha512WithECDSA),
            ID_ED25519 => Ok(SignatureAlgorithm::Ed25519),
            other => Err(CertGuardError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Checks that `cert` was signed by the private key matching `issuer_key`.
///
/// Returns `UnsupportedAlgorithm` or `InvalidKey` when the check cannot be
/// carried out, and `SignatureMismatch` when it fails.
pub fn verify_signed_by(cert: &X509, issuer_key: &SubjectPublicKeyInfoOwned) -> Result<()> {
    let algorithm = SignatureAlgorithm::try_from(&cert.signature_algorithm)?;
    let tbs = cert
        .tbs_certificate
        .to_der()
        .map_err(|e| CertGuardError::EncodingError(e.to_string()))?;
    let signature = cert.signature.as_bytes().ok_or_else(|| {
        CertGuardError::DecodingError("signature has unused bits".to_string())
    })?;
    verify(algorithm, &tbs, signature, issuer_key)
}

/// Verifies `signature` over `message` with the public key in `key`.
pub fn verify(
    algorithm: SignatureAlgorithm,
    message: &[u8],
    signature: &[u8],
    key: &SubjectPublicKeyInfoOwned,
) -> Result<()> {
    match algorithm {
        SignatureAlgorithm::Sha1WithRSA => verify_rsa::<Sha1>(message, signature, key),
        SignatureAlgorithm::Sha256WithRSA => verify_rsa::<Sha256>(message, signature, key),
        SignatureAlgorithm::Sha384WithRSA => verify_rsa::<Sha384>(message, signature, key),
        SignatureAlgorithm::Sha512WithRSA => verify_rsa::<Sha512>(message, signature, key),
        SignatureAlgorithm::Sha256WithECDSA => {
            verify_ecdsa(&Sha256::digest(message), message, signature, key, false)
        }
        SignatureAlgorithm::Sha384WithECDSA => {
            verify_ecdsa(&Sha384::digest(message), message, signature, key, false)
        }
        SignatureAlgorithm::Sha512WithECDSA => {
            verify_ecdsa(&Sha512::digest(message), message, signature, key, true)
        }
        SignatureAlgorithm::Ed25519 => verify_ed25519(message, signature, key),
    }
}

fn verify_rsa<D>(message: &[u8], signature: &[u8], key: &SubjectPublicKeyInfoOwned) -> Result<()>
where
    D: Digest + AssociatedOid,
{
    expect_key_algorithm(key, RSA_ENCRYPTION)?;
    let spki_der = key
        .to_der()
        .map_err(|e| CertGuardError::InvalidKey(e.to_string()))?;
    let public = RsaPublicKey::from_public_key_der(&spki_der)
        .map_err(|e| CertGuardError::InvalidKey(e.to_string()))?;
    let verifying_key = rsa::pkcs1v15::VerifyingKey::<D>::new(public);
    let signature = rsa::pkcs1v15::Signature::try_from(signature)
        .map_err(|_| CertGuardError::SignatureMismatch)?;
    verifying_key
        .verify(message, &signature)
        .map_err(|_| CertGuardError::SignatureMismatch)
}

/// ECDSA over P-256 and P-384 checks the precomputed digest. P-521 keys
/// are accepted with SHA-512 only.
fn verify_ecdsa(
    prehash: &[u8],
    message: &[u8],
    signature: &[u8],
    key: &SubjectPublicKeyInfoOwned,
    sha512: bool,
) -> Result<()> {
    expect_key_algorithm(key, ID_EC_PUBLIC_KEY)?;
    let curve = key
        .algorithm
        .parameters
        .as_ref()
        .ok_or_else(|| CertGuardError::InvalidKey("missing EC curve parameters".to_string()))?
        .decode_as::<ObjectIdentifier>()
        .map_err(|e| CertGuardError::InvalidKey(e.to_string()))?;
    let point = key.subject_public_key.raw_bytes();
    let invalid_key = |e: ecdsa::Error| CertGuardError::InvalidKey(e.to_string());

    match curve {
        SECP256R1 => {
            let verifying_key = p256::ecdsa::VerifyingKey::from_sec1_bytes(point).map_err(invalid_key)?;
            let signature = p256::ecdsa::Signature::from_der(signature)
                .map_err(|_| CertGuardError::SignatureMismatch)?;
            verifying_key
                .verify_prehash(prehash, &signature)
                .map_err(|_| CertGuardError::SignatureMismatch)
        }
        SECP384R1 => {
            let verifying_key = p384::ecdsa::VerifyingKey::from_sec1_bytes(point).map_err(invalid_key)?;
            let signature = p384::ecdsa::Signature::from_der(signature)
                .map_err(|_| CertGuardError::SignatureMismatch)?;
            verifying_key
                .verify_prehash(prehash, &signature)
                .map_err(|_| CertGuardError::SignatureMismatch)
        }
        SECP521R1 if sha512 => {
            let verifying_key = p521::ecdsa::VerifyingKey::from_sec1_bytes(point).map_err(invalid_key)?;
            let signature = p521::ecdsa::Signature::from_der(signature)
                .map_err(|_| CertGuardError::SignatureMismatch)?;
            verifying_key
                .verify(message, &signature)
                .map_err(|_| CertGuardError::SignatureMismatch)
        }
        other => Err(CertGuardError::UnsupportedAlgorithm(format!(
            "ECDSA curve {other}"
        ))),
    }
}

fn verify_ed25519(message: &[u8], signature: &[u8], key: &SubjectPublicKeyInfoOwned) -> Result<()> {
    expect_key_algorithm(key, ID_ED25519)?;
    let bytes: [u8; 32] = key
        .subject_public_key
        .raw_bytes()
        .try_into()
        .map_err(|_| CertGuardError::InvalidKey("Ed25519 key must be 32 bytes".to_string()))?;
    let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(&bytes)
        .map_err(|e| CertGuardError::InvalidKey(e.to_string()))?;
    let signature = ed25519_dalek::Signature::from_slice(signature)
        .map_err(|_| CertGuardError::SignatureMismatch)?;
    verifying_key
        .verify_strict(message, &signature)
        .map_err(|_| CertGuardError::SignatureMismatch)
}

fn expect_key_algorithm(key: &SubjectPublicKeyInfoOwned, expected: ObjectIdentifier) -> Result<()> {
    if key.algorithm.oid == expected {
        Ok(())
    } else {
        Err(CertGuardError::InvalidKey(format!(
            "expected {expected} key, found {}",
            key.algorithm.oid
        )))
    }
}
