use serde::Serialize;
use tracing::debug;

use crate::model::saml_response::SamlResponse;
use crate::orchestrator::{Outcome, Resolution};
use crate::parsers::certificate::Certificate;
use crate::parsers::ParserTier;

pub const ENCRYPTED_ADVISORY: &str = "SAML response is encrypted. Cannot parse.\n\
     Advise customer to update their identity provider \
     to send an unencrypted SAML response.";

pub const REQUEST_ADVISORY: &str =
    "The input data appears to be a SAML request instead of a SAML response.\n\
     Please ask the customer for the SAML response instead of the request.";

pub const NO_VALUES_MESSAGE: &str =
    "Could not parse any relevant information from the input data.\n\
     Please make sure that your input contains SAML data.";

pub const NO_CERTIFICATE_MESSAGE: &str =
    "Could not locate certificate. Identity provider info will not be available.";

fn fallback_warning(tier: ParserTier) -> String {
    format!(
        "WARNING: XML parsing failed. Using fallback '{}' parser. \
         Some values may not parse correctly.",
        tier
    )
}

/// Everything learned from one input: what parsed, what is trustworthy, and
/// the messages explaining why not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticReport {
    saml_valid: bool,
    cert_valid: bool,
    parser_tier: ParserTier,
    errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    saml: Option<SamlResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    certificate: Option<Certificate>,
}

impl DiagnosticReport {
    /// Classify a parse resolution and derive the validity flags.
    pub fn from_resolution(resolution: Resolution) -> Self {
        let Resolution { outcome, tier } = resolution;
        let mut errors = Vec::new();

        if tier != ParserTier::Strict {
            errors.push(fallback_warning(tier));
        }

        let saml = match outcome {
            Outcome::EncryptedResponse => {
                errors.push(ENCRYPTED_ADVISORY.to_string());
                return Self::invalid(tier, errors);
            }
            Outcome::IsARequest => {
                errors.push(REQUEST_ADVISORY.to_string());
                return Self::invalid(tier, errors);
            }
            Outcome::Parsed(saml) => saml,
        };

        let saml_valid = saml.found_any_values();
        if !saml_valid {
            errors.push(NO_VALUES_MESSAGE.to_string());
        }

        let mut certificate = None;
        if saml_valid {
            match saml.certificate() {
                Some(blob) => match Certificate::from_base64(blob) {
                    Ok(cert) => certificate = Some(cert),
                    Err(e) => {
                        debug!(error = %e, "certificate could not be decoded");
                        errors.push(format!("Could not decode certificate: {:#}", e));
                    }
                },
                None => errors.push(NO_CERTIFICATE_MESSAGE.to_string()),
            }
        }

        Self {
            saml_valid,
            cert_valid: certificate.is_some(),
            parser_tier: tier,
            errors,
            saml: Some(saml),
            certificate,
        }
    }

    fn invalid(tier: ParserTier, errors: Vec<String>) -> Self {
        Self {
            saml_valid: false,
            cert_valid: false,
            parser_tier: tier,
            errors,
            saml: None,
            certificate: None,
        }
    }

    pub fn saml(&self) -> Option<&SamlResponse> {
        self.saml.as_ref()
    }

    pub fn certificate(&self) -> Option<&Certificate> {
        self.certificate.as_ref()
    }

    pub fn saml_is_valid(&self) -> bool {
        self.saml_valid
    }

    pub fn cert_is_valid(&self) -> bool {
        self.cert_valid
    }

    pub fn parser_tier(&self) -> ParserTier {
        self.parser_tier
    }

    /// Messages in the order they were discovered.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}
