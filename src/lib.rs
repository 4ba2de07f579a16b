//! # CertGuard - Pure Rust X.509 Certificate Handles and Verification
//!
//! CertGuard wraps a parsed X.509 certificate in a small value type that
//! knows whether it owns the parsed structure or borrows it from the caller,
//! exposes the certificate's identity, and verifies it for a host name
//! against a trust policy. It is built entirely with rustcrypto libraries,
//! without dependencies on ring or openssl (except for testing).
//!
//! ## Loading Certificates
//!
//! - **Stream**: [`cert::Certificate::from_reader`] copies the stream to a
//!   temporary file and parses the first PEM certificate in it
//! - **File**: [`cert::Certificate::from_path`]
//! - **Memory**: [`cert::Certificate::from_pem`] and [`cert::Certificate::from_der`]
//! - **Existing handle**: [`cert::Certificate::from_handle`] borrows a parsed
//!   certificate without taking ownership
//!
//! Certificates loaded by the crate own their parsed structure and every
//! clone gets its own copy. Certificates built from a handle share the
//! caller's structure, and the borrow checker keeps it alive for them.
//!
//! ## Supported Signature Algorithms
//!
//! - **RSA**: PKCS#1 v1.5 with SHA-1, SHA-256, SHA-384 and SHA-512
//! - **ECDSA**: P-256 and P-384 with SHA-256/384/512, P-521 with SHA-512
//! - **Ed25519**: Edwards curve digital signature algorithm
//!
//! ## Quick Start
//!
//! ### Reading Identity Attributes
//!
//! ```rust,no_run
//! use certguard::cert::Certificate;
//!
//! # fn main() -> Result<(), certguard::error::CertGuardError> {
//! let cert = Certificate::from_path("server.pem")?;
//!
//! // One-line distinguished names, e.g. "/C=US/O=Example Corp/CN=example.com"
//! println!("Issuer:  {}", cert.issuer_name());
//! println!("Subject: {}", cert.subject_name());
//! println!("Expires: {}", cert.expires_on());
//! # Ok(())
//! # }
//! ```
//!
//! ### Verifying for a Host Name
//!
//! ```rust,no_run
//! use certguard::{
//!     cert::Certificate,
//!     policy::{Context, VerificationMode},
//! };
//!
//! # fn main() -> Result<(), certguard::error::CertGuardError> {
//! let mut context = Context::builder()
//!     .mode(VerificationMode::Strict)
//!     .build();
//! context.load_ca_file("ca.pem")?;
//!
//! let cert = Certificate::from_reader(std::io::stdin())?;
//! if cert.verify("server.example.com", &context) {
//!     println!("certificate accepted");
//! } else {
//!     println!("rejected: {}", cert.verify_result("server.example.com", &context));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Borrowing an Existing Handle
//!
//! ```rust,no_run
//! use certguard::{cert::Certificate, parser};
//!
//! # fn main() -> Result<(), certguard::error::CertGuardError> {
//! let x509 = parser::parse_pem(std::fs::File::open("server.pem")?)?;
//! let cert = Certificate::from_handle(&x509);
//! let copy = cert.clone(); // shares `x509`, nothing is duplicated
//! assert!(!copy.is_owned());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Loading fails with exactly one [`error::CertGuardError`]; verification
//! never fails, it reports a [`policy::VerifyResult`]:
//!
//! ```rust
//! use certguard::{cert::Certificate, error::CertGuardError};
//!
//! match Certificate::from_path("/does/not/exist.pem") {
//!     Ok(_) => println!("loaded"),
//!     Err(CertGuardError::ResourceNotFound { path, .. }) => println!("cannot open {}", path),
//!     Err(CertGuardError::CertificateParse { reason, .. }) => println!("not a certificate: {}", reason),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`cert`]: The certificate type, identity attributes and extensions
//! - [`policy`]: Trust policy, host name matching and signature checks
//! - [`parser`]: PEM/DER parsing and temporary-file materialization
//! - [`error`]: Comprehensive error types and handling

pub mod cert;
pub mod error;
pub mod parser;
pub mod policy;
