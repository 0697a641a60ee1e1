use tracing::{debug, warn};

use crate::model::saml_response::SamlResponse;
use crate::parsers::pattern::PatternParser;
use crate::parsers::standard::StandardParser;
use crate::parsers::{ParseOutcome, ParserTier, SamlParser};

/// Terminal state of the tiered parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Parsed(SamlResponse),
    EncryptedResponse,
    IsARequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub tier: ParserTier,
}

/// Runs the primary parser and falls back to the secondary one only when the
/// primary could not read the document at all.
///
/// Encrypted responses and requests are final no matter which tier spotted
/// them.
pub struct ParseOrchestrator {
    primary: Box<dyn SamlParser>,
    fallback: Box<dyn SamlParser>,
}

impl Default for ParseOrchestrator {
    fn default() -> Self {
        Self::new(Box::new(StandardParser), Box::new(PatternParser))
    }
}

impl ParseOrchestrator {
    pub fn new(primary: Box<dyn SamlParser>, fallback: Box<dyn SamlParser>) -> Self {
        Self { primary, fallback }
    }

    pub fn resolve(&self, xml: &str) -> Resolution {
        let result = self.primary.parse(xml);
        let tier = match (result.used_relaxed, self.primary.tier()) {
            (true, ParserTier::Strict) => ParserTier::Relaxed,
            (_, tier) => tier,
        };
        debug!(%tier, outcome = outcome_name(&result.outcome), "primary parser finished");

        let reason = match result.outcome {
            ParseOutcome::Success(saml) => return Resolution::new(Outcome::Parsed(saml), tier),
            ParseOutcome::EncryptedResponse => {
                return Resolution::new(Outcome::EncryptedResponse, tier)
            }
            ParseOutcome::IsARequest => return Resolution::new(Outcome::IsARequest, tier),
            ParseOutcome::GenericFailure(reason) => reason,
        };

        let tier = self.fallback.tier();
        warn!(%reason, fallback = %tier, "XML parsing failed, falling back");

        let outcome = match self.fallback.parse(xml).outcome {
            ParseOutcome::Success(saml) => Outcome::Parsed(saml),
            ParseOutcome::EncryptedResponse => Outcome::EncryptedResponse,
            ParseOutcome::IsARequest => Outcome::IsARequest,
            ParseOutcome::GenericFailure(reason) => {
                // Nothing could be extracted; the resolver reports it as empty data.
                debug!(%reason, "fallback parser failed");
                Outcome::Parsed(SamlResponse::default())
            }
        };
        Resolution::new(outcome, tier)
    }
}

impl Resolution {
    fn new(outcome: Outcome, tier: ParserTier) -> Self {
        Self { outcome, tier }
    }
}

fn outcome_name(outcome: &ParseOutcome) -> &'static str {
    match outcome {
        ParseOutcome::Success(_) => "success",
        ParseOutcome::EncryptedResponse => "encrypted",
        ParseOutcome::IsARequest => "request",
        ParseOutcome::GenericFailure(_) => "failure",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::ParseResult;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Parser returning a canned result and counting how often it ran.
    struct Canned {
        tier: ParserTier,
        result: ParseResult,
        calls: Arc<AtomicUsize>,
    }

    impl SamlParser for Canned {
        fn tier(&self) -> ParserTier {
            self.tier
        }

        fn parse(&self, _xml: &str) -> ParseResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn canned(tier: ParserTier, result: ParseResult) -> (Box<dyn SamlParser>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let parser = Canned {
            tier,
            result,
            calls: calls.clone(),
        };
        (Box::new(parser), calls)
    }

    fn issuer_only() -> SamlResponse {
        SamlResponse {
            issuer: Some("https://idp.example.com".to_string()),
            ..Default::default()
        }
    }

    fn run(primary: ParseResult, fallback: ParseResult) -> (Resolution, usize) {
        let (primary, _) = canned(ParserTier::Strict, primary);
        let (fallback, fallback_calls) = canned(ParserTier::Regex, fallback);
        let resolution = ParseOrchestrator::new(primary, fallback).resolve("<xml/>");
        (resolution, fallback_calls.load(Ordering::SeqCst))
    }

    #[test]
    fn strict_success_stops_at_first_tier() {
        let (res, fallback_calls) = run(
            ParseResult::new(ParseOutcome::Success(issuer_only())),
            ParseResult::new(ParseOutcome::Success(SamlResponse::default())),
        );
        assert_eq!(res.tier, ParserTier::Strict);
        assert_eq!(res.outcome, Outcome::Parsed(issuer_only()));
        assert_eq!(fallback_calls, 0);
    }

    #[test]
    fn relaxed_success_is_labelled_relaxed() {
        let (res, fallback_calls) = run(
            ParseResult::relaxed(ParseOutcome::Success(issuer_only())),
            ParseResult::new(ParseOutcome::Success(SamlResponse::default())),
        );
        assert_eq!(res.tier, ParserTier::Relaxed);
        assert_eq!(fallback_calls, 0);
    }

    #[test]
    fn encryption_is_terminal() {
        let (res, fallback_calls) = run(
            ParseResult::new(ParseOutcome::EncryptedResponse),
            ParseResult::new(ParseOutcome::Success(issuer_only())),
        );
        assert_eq!(res.outcome, Outcome::EncryptedResponse);
        assert_eq!(res.tier, ParserTier::Strict);
        assert_eq!(fallback_calls, 0);
    }

    #[test]
    fn request_is_terminal_and_keeps_relaxed_label() {
        let (res, fallback_calls) = run(
            ParseResult::relaxed(ParseOutcome::IsARequest),
            ParseResult::new(ParseOutcome::Success(issuer_only())),
        );
        assert_eq!(res.outcome, Outcome::IsARequest);
        assert_eq!(res.tier, ParserTier::Relaxed);
        assert_eq!(fallback_calls, 0);
    }

    #[test]
    fn generic_failure_falls_back() {
        let (res, fallback_calls) = run(
            ParseResult::new(ParseOutcome::GenericFailure("broken".into())),
            ParseResult::new(ParseOutcome::Success(issuer_only())),
        );
        assert_eq!(res.tier, ParserTier::Regex);
        assert_eq!(res.outcome, Outcome::Parsed(issuer_only()));
        assert_eq!(fallback_calls, 1);
    }

    #[test]
    fn fallback_can_still_classify_encryption() {
        let (res, _) = run(
            ParseResult::new(ParseOutcome::GenericFailure("broken".into())),
            ParseResult::new(ParseOutcome::EncryptedResponse),
        );
        assert_eq!(res.outcome, Outcome::EncryptedResponse);
        assert_eq!(res.tier, ParserTier::Regex);
    }

    #[test]
    fn fallback_failure_becomes_empty_response() {
        let (res, _) = run(
            ParseResult::new(ParseOutcome::GenericFailure("broken".into())),
            ParseResult::new(ParseOutcome::GenericFailure("still broken".into())),
        );
        assert_eq!(res.outcome, Outcome::Parsed(SamlResponse::default()));
        assert_eq!(res.tier, ParserTier::Regex);
    }

    #[test]
    fn default_pipeline_falls_back_on_truncated_xml() {
        let xml = include_str!("../tests/fixtures/truncated.xml");
        let res = ParseOrchestrator::default().resolve(xml);
        assert_eq!(res.tier, ParserTier::Regex);
        assert!(matches!(res.outcome, Outcome::Parsed(ref saml) if saml.issuer.is_some()));
    }
}
