use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Serialize;
use x509_parser::prelude::*;
use x509_parser::public_key::PublicKey;

/// Identity provider signing certificate decoded from a SAML response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Certificate {
    pub subject: String,
    pub issuer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    pub serial: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub key_size_bits: u32,
}

impl Certificate {
    /// Decode the base64 body of an `X509Certificate` element.
    pub fn from_base64(blob: &str) -> Result<Self> {
        let compact: String = blob.chars().filter(|c| !c.is_whitespace()).collect();
        let der = STANDARD
            .decode(compact.as_bytes())
            .context("Certificate is not valid base64")?;
        Self::from_der(&der)
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        let (_, cert) = X509Certificate::from_der(der)
            .map_err(|e| anyhow::anyhow!("X509 parse error: {}", e))?;

        let common_name = cert
            .subject()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .map(str::to_string);
        let organization = cert
            .subject()
            .iter_organization()
            .next()
            .and_then(|o| o.as_str().ok())
            .map(str::to_string);

        let not_before = cert.validity().not_before.to_datetime();
        let not_after = cert.validity().not_after.to_datetime();

        Ok(Certificate {
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            common_name,
            organization,
            serial: cert.raw_serial_as_string(),
            not_before: DateTime::from_timestamp(not_before.unix_timestamp(), 0)
                .unwrap_or_default(),
            not_after: DateTime::from_timestamp(not_after.unix_timestamp(), 0)
                .unwrap_or_default(),
            key_size_bits: key_size_bits(&cert),
        })
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.not_after
    }
}

fn key_size_bits(cert: &X509Certificate<'_>) -> u32 {
    match cert.public_key().parsed() {
        Ok(PublicKey::RSA(rsa)) => rsa.key_size() as u32,
        Ok(PublicKey::EC(_)) => {
            // Curve size from the named-curve OID
            let oid = cert
                .public_key()
                .algorithm
                .parameters
                .as_ref()
                .and_then(|p| p.as_oid().ok())
                .map(|oid| oid.to_string());
            match oid.as_deref() {
                Some("1.3.132.0.34") => 384,
                Some("1.3.132.0.35") => 521,
                _ => 256,
            }
        }
        _ => 0,
    }
}
