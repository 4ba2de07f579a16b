#![allow(dead_code)]

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::extension::{BasicConstraints, KeyUsage, SubjectAlternativeName};
use openssl::x509::{X509, X509Name, X509NameBuilder};

pub const CA_NAME: &str = "myca.local";
pub const SERVER_NAME: &str = "server.myca.local";

#[derive(Debug, Clone, Copy)]
pub enum KeyKind {
    EcdsaP256,
    EcdsaP384,
    Rsa2048,
    Ed25519,
}

/// A certificate minted by OpenSSL together with its private key.
pub struct Issued {
    pub cert: X509,
    pub key: PKey<Private>,
    pub kind: KeyKind,
}

impl Issued {
    pub fn pem(&self) -> Vec<u8> {
        self.cert.to_pem().unwrap()
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn generate_key(kind: KeyKind) -> PKey<Private> {
    match kind {
        KeyKind::EcdsaP256 => {
            let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
            PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
        }
        KeyKind::EcdsaP384 => {
            let group = EcGroup::from_curve_name(Nid::SECP384R1).unwrap();
            PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
        }
        KeyKind::Rsa2048 => PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap(),
        KeyKind::Ed25519 => PKey::generate_ed25519().unwrap(),
    }
}

fn digest_for(kind: KeyKind) -> MessageDigest {
    match kind {
        KeyKind::EcdsaP256 | KeyKind::Rsa2048 => MessageDigest::sha256(),
        KeyKind::EcdsaP384 => MessageDigest::sha384(),
        KeyKind::Ed25519 => MessageDigest::null(),
    }
}

pub fn name(common_name: &str) -> X509Name {
    let mut builder = X509NameBuilder::new().unwrap();
    builder.append_entry_by_text("C", "US").unwrap();
    builder
        .append_entry_by_text("O", "Crab widgits SE")
        .unwrap();
    builder.append_entry_by_text("CN", common_name).unwrap();
    builder.build()
}

/// Generates a self-signed CA certificate.
pub fn generate_ca_cert(kind: KeyKind) -> Issued {
    build_ca(kind, CA_NAME, true, true)
}

/// Generates a self-signed issuer with configurable CA flag and key usage.
pub fn build_ca(kind: KeyKind, common_name: &str, is_ca: bool, cert_sign: bool) -> Issued {
    let key = generate_key(kind);
    let subject = name(common_name);

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&subject).unwrap();
    builder.set_issuer_name(&subject).unwrap();
    builder.set_pubkey(&key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(3650).unwrap())
        .unwrap();

    let mut constraints = BasicConstraints::new();
    constraints.critical();
    if is_ca {
        constraints.ca();
    }
    builder.append_extension(constraints.build().unwrap()).unwrap();

    let mut usage = KeyUsage::new();
    usage.critical();
    if cert_sign {
        usage.key_cert_sign().crl_sign();
    } else {
        usage.digital_signature();
    }
    builder.append_extension(usage.build().unwrap()).unwrap();

    builder.sign(&key, digest_for(kind)).unwrap();
    Issued {
        cert: builder.build(),
        key,
        kind,
    }
}

/// Issues a P-256 leaf certificate signed by `ca`, valid for one year.
pub fn issue_leaf(ca: &Issued, common_name: &str, dns: &[&str], ips: &[&str]) -> Issued {
    issue_leaf_with_serial(ca, "02", common_name, dns, ips)
}

/// Like [`issue_leaf`], with the serial number given in hex.
pub fn issue_leaf_with_serial(
    ca: &Issued,
    serial_hex: &str,
    common_name: &str,
    dns: &[&str],
    ips: &[&str],
) -> Issued {
    let key = generate_key(KeyKind::EcdsaP256);

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_hex_str(serial_hex)
        .unwrap()
        .to_asn1_integer()
        .unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name(common_name)).unwrap();
    builder.set_issuer_name(ca.cert.subject_name()).unwrap();
    builder.set_pubkey(&key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(365).unwrap())
        .unwrap();

    if !dns.is_empty() || !ips.is_empty() {
        let mut san = SubjectAlternativeName::new();
        for entry in dns {
            san.dns(entry);
        }
        for entry in ips {
            san.ip(entry);
        }
        let extension = san
            .build(&builder.x509v3_context(Some(&*ca.cert), None))
            .unwrap();
        builder.append_extension(extension).unwrap();
    }

    builder.sign(&ca.key, digest_for(ca.kind)).unwrap();
    Issued {
        cert: builder.build(),
        key,
        kind: KeyKind::EcdsaP256,
    }
}

/// Issues the default server certificate: CN and SAN `server.myca.local`,
/// SAN IP `127.0.0.1`.
pub fn issue_server_cert(ca: &Issued) -> Issued {
    issue_leaf(ca, SERVER_NAME, &[SERVER_NAME], &["127.0.0.1"])
}

/// Generates a self-signed, non-CA server certificate.
pub fn self_signed_server_cert() -> Issued {
    let key = generate_key(KeyKind::EcdsaP256);
    let subject = name(SERVER_NAME);

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(7).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&subject).unwrap();
    builder.set_issuer_name(&subject).unwrap();
    builder.set_pubkey(&key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(365).unwrap())
        .unwrap();
    let san = SubjectAlternativeName::new()
        .dns(SERVER_NAME)
        .build(&builder.x509v3_context(None, None))
        .unwrap();
    builder.append_extension(san).unwrap();
    builder.sign(&key, MessageDigest::sha256()).unwrap();

    Issued {
        cert: builder.build(),
        key,
        kind: KeyKind::EcdsaP256,
    }
}
