use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{ParseOutcome, ParseResult, ParserTier, SamlParser};
use crate::model::saml_response::SamlResponse;

static REQUEST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(?:[\w.-]+:)?\w*Request\b").unwrap());
static RESPONSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<(?:[\w.-]+:)?Response\b").unwrap());
static ENCRYPTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(?:[\w.-]+:)?EncryptedAssertion\b").unwrap());

static ISSUER: Lazy<Regex> = Lazy::new(|| element_text("Issuer"));
static AUDIENCE: Lazy<Regex> = Lazy::new(|| element_text("Audience"));
static CERTIFICATE: Lazy<Regex> = Lazy::new(|| element_text("X509Certificate"));
static NAME_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<(?:[\w.-]+:)?NameID\b([^>]*)>\s*([^<]+?)\s*</").unwrap()
});
static DESTINATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<(?:[\w.-]+:)?Response\b[^>]*?\sDestination\s*=\s*"([^"]*)""#).unwrap()
});
static RECIPIENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\sRecipient\s*=\s*"([^"]*)""#).unwrap());
static FORMAT: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\sFormat\s*=\s*"([^"]*)""#).unwrap());
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)<(?:[\w.-]+:)?Attribute\b([^>]*?)(?:/>|>(.*?)</(?:[\w.-]+:)?Attribute>)",
    )
    .unwrap()
});
static ATTRIBUTE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\sName\s*=\s*"([^"]*)""#).unwrap());
static ATTRIBUTE_VALUE: Lazy<Regex> = Lazy::new(|| element_text("AttributeValue"));

fn element_text(local: &str) -> Regex {
    Regex::new(&format!(
        r"(?s)<(?:[\w.-]+:)?{}\b[^>]*>\s*([^<]*?)\s*</",
        local
    ))
    .unwrap()
}

/// Last-resort parser that pattern-matches fields out of the raw text.
///
/// It never fails outright: a document with nothing recognizable yields a
/// [`SamlResponse`] without values.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternParser;

impl SamlParser for PatternParser {
    fn tier(&self) -> ParserTier {
        ParserTier::Regex
    }

    fn parse(&self, xml: &str) -> ParseResult {
        if REQUEST.is_match(xml) && !RESPONSE.is_match(xml) {
            return ParseResult::new(ParseOutcome::IsARequest);
        }
        if ENCRYPTED.is_match(xml) {
            return ParseResult::new(ParseOutcome::EncryptedResponse);
        }

        let mut saml = SamlResponse::default();
        fill_capture(&mut saml.issuer, &ISSUER, xml, 1);
        fill_capture(&mut saml.audience, &AUDIENCE, xml, 1);
        fill_capture(&mut saml.certificate, &CERTIFICATE, xml, 1);
        fill_capture(&mut saml.acs, &DESTINATION, xml, 1);
        fill_capture(&mut saml.acs, &RECIPIENT, xml, 1);

        if let Some(caps) = NAME_ID.captures(xml) {
            SamlResponse::fill(&mut saml.name_id, &unescape(&caps[2]));
            fill_capture(&mut saml.name_id_format, &FORMAT, &caps[1], 1);
        }

        for caps in ATTRIBUTE.captures_iter(xml) {
            let Some(name) = ATTRIBUTE_NAME.captures(&caps[1]) else {
                continue;
            };
            let name = unescape(&name[1]);
            let Some(body) = caps.get(2) else {
                continue;
            };
            for value in ATTRIBUTE_VALUE.captures_iter(body.as_str()) {
                if !value[1].is_empty() {
                    saml.push_attribute(&name, unescape(&value[1]));
                }
            }
        }

        debug!(found_values = saml.found_any_values(), "regex parser finished");
        ParseResult::new(ParseOutcome::Success(saml))
    }
}

fn fill_capture(slot: &mut Option<String>, re: &Regex, haystack: &str, group: usize) {
    if let Some(m) = re.captures(haystack).and_then(|c| c.get(group)) {
        SamlResponse::fill(slot, &unescape(m.as_str()));
    }
}

fn unescape(raw: &str) -> String {
    quick_xml::escape::unescape(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
