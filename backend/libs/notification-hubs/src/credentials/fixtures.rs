//! Generated RSA push certificates for credential tests

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use p12::PFX;
use rcgen::{CertificateParams, KeyPair};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use time::OffsetDateTime;

// key generation is slow; every test shares these two
pub(crate) static PUSH_KEY: Lazy<RsaPrivateKey> = Lazy::new(generate_key);
pub(crate) static OTHER_KEY: Lazy<RsaPrivateKey> = Lazy::new(generate_key);

fn generate_key() -> RsaPrivateKey {
    RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap()
}

pub(crate) struct Issued {
    pub der: Vec<u8>,
    pub pem: String,
}

/// Self-signs a certificate for `key` over the given validity window
pub(crate) fn issue(key: &RsaPrivateKey, not_before: OffsetDateTime, not_after: OffsetDateTime) -> Issued {
    let pkcs8 = key.to_pkcs8_der().unwrap();
    let signer = KeyPair::try_from(pkcs8.as_bytes()).unwrap();

    let mut params = CertificateParams::new(vec!["push.example.com".to_string()]).unwrap();
    params.not_before = not_before;
    params.not_after = not_after;
    let cert = params.self_signed(&signer).unwrap();

    Issued {
        der: cert.der().to_vec(),
        pem: cert.pem(),
    }
}

pub(crate) enum KeyEncoding<'a> {
    Omitted,
    Pkcs8,
    Pkcs1,
    Encrypted(&'a str),
}

/// Base64 PEM bundle of the certificate followed by `key`
pub(crate) fn pem_bundle(cert: &Issued, key: &RsaPrivateKey, encoding: KeyEncoding<'_>) -> String {
    let key_pem = match encoding {
        KeyEncoding::Omitted => String::new(),
        KeyEncoding::Pkcs8 => key.to_pkcs8_pem(LineEnding::LF).unwrap().to_string(),
        KeyEncoding::Pkcs1 => key.to_pkcs1_pem(LineEnding::LF).unwrap().to_string(),
        KeyEncoding::Encrypted(password) => key
            .to_pkcs8_encrypted_pem(&mut rand::thread_rng(), password, LineEnding::LF)
            .unwrap()
            .to_string(),
    };
    STANDARD.encode(format!("{}{}", cert.pem, key_pem))
}

/// Base64 PKCS#12 archive of the certificate and `key`
pub(crate) fn pkcs12_bundle(cert: &Issued, key: &RsaPrivateKey, password: &str) -> String {
    let pkcs8 = key.to_pkcs8_der().unwrap();
    let pfx = PFX::new(&cert.der, pkcs8.as_bytes(), None, password, "apns").unwrap();
    STANDARD.encode(pfx.to_der())
}
