pub mod certificate;
pub mod har;
pub mod pattern;
pub mod standard;

use serde::Serialize;

use crate::model::saml_response::SamlResponse;

/// Which parser produced the SAML values, from most to least precise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserTier {
    Strict,
    Relaxed,
    Regex,
}

impl std::fmt::Display for ParserTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParserTier::Strict => write!(f, "strict"),
            ParserTier::Relaxed => write!(f, "relaxed"),
            ParserTier::Regex => write!(f, "regex"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Success(SamlResponse),
    EncryptedResponse,
    IsARequest,
    /// The document could not be read at all; the reason is for logging only.
    GenericFailure(String),
}

/// Result of a single parse attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub outcome: ParseOutcome,
    /// The parser silently downgraded to its relaxed mode
    pub used_relaxed: bool,
}

impl ParseResult {
    pub fn new(outcome: ParseOutcome) -> Self {
        Self {
            outcome,
            used_relaxed: false,
        }
    }

    pub fn relaxed(outcome: ParseOutcome) -> Self {
        Self {
            outcome,
            used_relaxed: true,
        }
    }
}

/// A strategy for pulling SAML values out of decoded XML.
pub trait SamlParser: Send + Sync {
    /// Tier reported when this parser succeeds without relaxing itself.
    fn tier(&self) -> ParserTier;

    fn parse(&self, xml: &str) -> ParseResult;
}

/// Local part of a possibly prefixed XML name (`saml:Issuer` -> `Issuer`).
pub(crate) fn local_name(name: &[u8]) -> String {
    let full = String::from_utf8_lossy(name);
    full.rsplit(':').next().unwrap_or(&full).to_string()
}

/// Request message types share the `Request` suffix (`AuthnRequest`, `LogoutRequest`, ...).
pub(crate) fn is_request_element(local: &str) -> bool {
    local.ends_with("Request")
}
