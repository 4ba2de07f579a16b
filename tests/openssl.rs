mod util;

use std::process::Command;

use certguard::cert::Certificate;
use openssl::asn1::Asn1Time;
use openssl::x509::X509NameRef;
use util::KeyKind;

/// Renders an OpenSSL name the way `X509_NAME_oneline` does for plain ASCII values.
fn openssl_oneline(name: &X509NameRef) -> String {
    name.entries()
        .map(|entry| {
            format!(
                "/{}={}",
                entry.object().nid().short_name().unwrap(),
                entry.data().as_utf8().unwrap()
            )
        })
        .collect()
}

#[test]
fn test_names_agree_with_openssl() {
    util::init_logging();
    let ca = util::generate_ca_cert(KeyKind::EcdsaP256);
    let server = util::issue_server_cert(&ca);
    let cert = Certificate::from_pem(&server.pem()).unwrap();

    assert_eq!(cert.issuer_name(), openssl_oneline(server.cert.issuer_name()));
    assert_eq!(cert.subject_name(), openssl_oneline(server.cert.subject_name()));
}

#[test]
fn test_attributes_agree_with_openssl() {
    let ca = util::generate_ca_cert(KeyKind::Rsa2048);
    let server = util::issue_server_cert(&ca);
    let cert = Certificate::from_pem(&server.pem()).unwrap();

    let serial = server
        .cert
        .serial_number()
        .to_bn()
        .unwrap()
        .to_hex_str()
        .unwrap()
        .to_lowercase();
    assert_eq!(cert.serial_number(), serial);

    let not_after = Asn1Time::from_unix(cert.expires_on().unix_timestamp()).unwrap();
    let diff = server.cert.not_after().diff(&not_after).unwrap();
    assert_eq!((diff.days, diff.secs), (0, 0), "Not After mismatch");

    let not_before = Asn1Time::from_unix(cert.valid_from().unix_timestamp()).unwrap();
    let diff = server.cert.not_before().diff(&not_before).unwrap();
    assert_eq!((diff.days, diff.secs), (0, 0), "Not Before mismatch");

    assert_eq!(cert.to_der().unwrap(), server.cert.to_der().unwrap());
}

#[test]
fn test_serial_numbers_agree_with_openssl() {
    let ca = util::generate_ca_cert(KeyKind::EcdsaP256);
    for serial_hex in ["8A0B", "7F", "80", "0100", "FF00FF00FF00FF00FF00FF00FF00FF00FF00FF00"] {
        let leaf = util::issue_leaf_with_serial(&ca, serial_hex, util::SERVER_NAME, &[], &[]);
        let cert = Certificate::from_pem(&leaf.pem()).unwrap();

        let expected = leaf
            .cert
            .serial_number()
            .to_bn()
            .unwrap()
            .to_hex_str()
            .unwrap()
            .to_lowercase();
        assert_eq!(cert.serial_number(), expected, "serial {serial_hex}");
    }
}

#[test]
fn test_issued_by_agrees_with_openssl() {
    for kind in [
        KeyKind::EcdsaP256,
        KeyKind::EcdsaP384,
        KeyKind::Rsa2048,
        KeyKind::Ed25519,
    ] {
        let ca = util::generate_ca_cert(kind);
        let other = util::generate_ca_cert(kind);
        let server = util::issue_server_cert(&ca);

        let cert = Certificate::from_pem(&server.pem()).unwrap();
        for issuer in [&ca, &other] {
            let expected = server
                .cert
                .verify(&issuer.cert.public_key().unwrap())
                .unwrap();
            let actual = cert.issued_by(&Certificate::from_pem(&issuer.pem()).unwrap());
            assert_eq!(actual, expected, "{kind:?}");
        }
    }
}

#[test]
fn test_openssl_reads_saved_cert() {
    let ca = util::generate_ca_cert(KeyKind::EcdsaP256);
    let server = util::issue_server_cert(&ca);
    let cert = Certificate::from_pem(&server.pem()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let cert_path = dir.path().join("server.pem");
    cert.save(&cert_path).unwrap();

    // Use OpenSSL CLI to read back the saved certificate
    let output = Command::new("openssl")
        .arg("x509")
        .arg("-in")
        .arg(&cert_path)
        .arg("-noout")
        .arg("-text")
        .output()
        .expect("Failed to execute OpenSSL command");

    assert!(
        output.status.success(),
        "OpenSSL command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let output_text = String::from_utf8_lossy(&output.stdout);
    assert!(
        output_text.contains("server.myca.local"),
        "Subject field is missing"
    );
    assert!(
        output_text.contains("Signature Algorithm: ecdsa-with-SHA256"),
        "Signature Algorithm field is incorrect"
    );
}
