//! APNs client certificate decoding
//!
//! The stored certificate is base64 of one of:
//! - a PEM bundle holding the certificate and its private key
//! - a PKCS#12 archive, opened with the credential's `CertificateKey`
//! - a bare DER certificate (which therefore has no private key)
//!
//! APNs client certificates carry RSA keys. A key is only accepted once it
//! parses, decrypts with the supplied `CertificateKey` where needed, and
//! matches the certificate's public key.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use p12::PFX;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::pkcs8::DecodePrivateKey;
use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing::{debug, warn};
use x509_parser::prelude::*;

use crate::error::{Result, ValidationError};

/// Certificates closer than this to expiry pass with a warning
const EXPIRY_WARNING_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    pub subject: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    /// A private key matching the certificate was decoded
    pub has_private_key: bool,
}

impl CertificateInfo {
    /// Rejects a certificate without a private key or outside its validity
    /// window; `not_after` itself is already expired
    pub fn check_usable_at(&self, now: DateTime<Utc>) -> Result<()> {
        if !self.has_private_key {
            return Err(ValidationError::credential_unusable(
                "certificate does not contain a private key",
            ));
        }
        if now >= self.not_after {
            return Err(ValidationError::credential_unusable(format!(
                "certificate expired at {}",
                self.not_after.to_rfc3339()
            )));
        }
        if now < self.not_before {
            return Err(ValidationError::credential_unusable(format!(
                "certificate is not valid before {}",
                self.not_before.to_rfc3339()
            )));
        }

        let remaining = self.not_after - now;
        if remaining < Duration::days(EXPIRY_WARNING_DAYS) {
            warn!(
                subject = %self.subject,
                days_remaining = remaining.num_days(),
                "APNs certificate expiring soon - rotation recommended"
            );
        }
        Ok(())
    }
}

/// Certificate DER plus the private key shipped alongside it, if any
struct DecodedBundle {
    certificate: Vec<u8>,
    private_key: Option<RsaPrivateKey>,
}

/// Decodes a base64 certificate; failures become `ApnsCertificateNotUsable`
pub fn decode_certificate(encoded: &str, certificate_key: Option<&str>) -> Result<CertificateInfo> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| ValidationError::credential_unusable(format!("invalid base64: {}", e)))?;

    let bundle = if looks_like_pem(&bytes) {
        decode_pem_bundle(&bytes, certificate_key)?
    } else if let Ok(pfx) = PFX::parse(&bytes) {
        decode_pkcs12(&pfx, certificate_key)?
    } else {
        DecodedBundle {
            certificate: bytes,
            private_key: None,
        }
    };

    let (_, cert) = X509Certificate::from_der(&bundle.certificate).map_err(|e| {
        ValidationError::credential_unusable(format!("X.509 parse failed: {}", e))
    })?;

    if let Some(key) = &bundle.private_key {
        if !key_matches_certificate(key, &cert) {
            return Err(ValidationError::credential_unusable(
                "private key does not match the certificate",
            ));
        }
    }

    let validity = cert.validity();
    let info = CertificateInfo {
        subject: cert.subject().to_string(),
        not_before: to_utc(validity.not_before.timestamp())?,
        not_after: to_utc(validity.not_after.timestamp())?,
        has_private_key: bundle.private_key.is_some(),
    };
    debug!(
        subject = %info.subject,
        not_before = %info.not_before,
        not_after = %info.not_after,
        has_private_key = info.has_private_key,
        "Decoded APNs certificate"
    );
    Ok(info)
}

fn looks_like_pem(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..].starts_with(b"-----BEGIN")
}

fn decode_pem_bundle(bytes: &[u8], certificate_key: Option<&str>) -> Result<DecodedBundle> {
    let blocks = ::pem::parse_many(bytes)
        .map_err(|e| ValidationError::credential_unusable(format!("invalid PEM: {}", e)))?;

    let certificate = blocks
        .iter()
        .find(|block| block.tag() == "CERTIFICATE")
        .ok_or_else(|| ValidationError::credential_unusable("PEM bundle holds no certificate"))?;

    let private_key = blocks
        .iter()
        .find(|block| block.tag().ends_with("PRIVATE KEY"))
        .map(|block| parse_pem_key(block, certificate_key))
        .transpose()?;

    Ok(DecodedBundle {
        certificate: certificate.contents().to_vec(),
        private_key,
    })
}

fn parse_pem_key(block: &::pem::Pem, certificate_key: Option<&str>) -> Result<RsaPrivateKey> {
    let key = match block.tag() {
        "PRIVATE KEY" => RsaPrivateKey::from_pkcs8_der(block.contents())
            .map_err(|e| key_unusable("PKCS#8", e))?,
        "RSA PRIVATE KEY" => RsaPrivateKey::from_pkcs1_der(block.contents())
            .map_err(|e| key_unusable("PKCS#1", e))?,
        "ENCRYPTED PRIVATE KEY" => {
            let password = certificate_key.filter(|k| !k.is_empty()).ok_or_else(|| {
                ValidationError::credential_unusable(
                    "private key is encrypted but no certificate key was supplied",
                )
            })?;
            RsaPrivateKey::from_pkcs8_encrypted_der(block.contents(), password).map_err(|_| {
                ValidationError::credential_unusable(
                    "private key could not be decrypted with the certificate key",
                )
            })?
        }
        other => {
            return Err(ValidationError::credential_unusable(format!(
                "unsupported private key type '{}'",
                other
            )))
        }
    };

    key.validate().map_err(|e| key_unusable("RSA", e))?;
    Ok(key)
}

/// Opens a PKCS#12 archive with the certificate key (empty when absent)
fn decode_pkcs12(pfx: &PFX, certificate_key: Option<&str>) -> Result<DecodedBundle> {
    let password = certificate_key.unwrap_or("");
    if !pfx.verify_mac(password) {
        return Err(ValidationError::credential_unusable(
            "PKCS#12 archive could not be opened with the certificate key",
        ));
    }

    let certificates = pfx.cert_x509_bags(password).map_err(|e| {
        ValidationError::credential_unusable(format!("PKCS#12 certificates unreadable: {:?}", e))
    })?;
    let keys = pfx.key_bags(password).map_err(|e| {
        ValidationError::credential_unusable(format!("PKCS#12 private key unreadable: {:?}", e))
    })?;

    let private_key = match keys.first() {
        Some(der) => {
            let key = RsaPrivateKey::from_pkcs8_der(der).map_err(|e| key_unusable("PKCS#12", e))?;
            key.validate().map_err(|e| key_unusable("RSA", e))?;
            Some(key)
        }
        None => None,
    };

    // the leaf is the entry whose public key pairs with the private key
    let certificate = match &private_key {
        Some(key) => certificates.into_iter().find(|der| {
            X509Certificate::from_der(der)
                .map(|(_, cert)| key_matches_certificate(key, &cert))
                .unwrap_or(false)
        }),
        None => certificates.into_iter().next(),
    }
    .ok_or_else(|| {
        ValidationError::credential_unusable("PKCS#12 archive holds no certificate for its private key")
    })?;

    Ok(DecodedBundle {
        certificate,
        private_key,
    })
}

fn key_matches_certificate(key: &RsaPrivateKey, cert: &X509Certificate<'_>) -> bool {
    let certified: &[u8] = &cert.public_key().subject_public_key.data;
    RsaPublicKey::from(key)
        .to_pkcs1_der()
        .map(|public| public.as_bytes() == certified)
        .unwrap_or(false)
}

fn key_unusable(format: &str, err: impl std::fmt::Display) -> ValidationError {
    ValidationError::credential_unusable(format!("{} private key unreadable: {}", format, err))
}

fn to_utc(timestamp: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(timestamp, 0).ok_or_else(|| {
        ValidationError::credential_unusable(format!("certificate timestamp {} out of range", timestamp))
    })
}
