use std::borrow::Cow;

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::debug;

use super::{is_request_element, local_name, ParseOutcome, ParseResult, ParserTier, SamlParser};
use crate::model::saml_response::SamlResponse;

/// Event-based XML parser.
///
/// Reads the document strictly first. If that fails it silently retries with
/// end-tag checks, attribute syntax and entity decoding relaxed, and reports
/// the downgrade through [`ParseResult::used_relaxed`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Strict,
    Relaxed,
}

impl SamlParser for StandardParser {
    fn tier(&self) -> ParserTier {
        ParserTier::Strict
    }

    fn parse(&self, xml: &str) -> ParseResult {
        let strict_err = match scan(xml, Mode::Strict) {
            Ok(scan) => return ParseResult::new(scan.classify()),
            Err(e) => e,
        };
        debug!(error = %strict_err, "strict XML parsing failed, retrying relaxed");

        match scan(xml, Mode::Relaxed) {
            Ok(scan) => ParseResult::relaxed(scan.classify()),
            Err(e) => {
                debug!(error = %e, "relaxed XML parsing failed");
                ParseResult::new(ParseOutcome::GenericFailure(format!("{:#}", e)))
            }
        }
    }
}

#[derive(Debug, Default)]
struct Scan {
    root: Option<String>,
    encrypted: bool,
    saml: SamlResponse,
    recipient: Option<String>,
    stack: Vec<String>,
    current_attribute: Option<String>,
    text: String,
}

impl Scan {
    fn classify(mut self) -> ParseOutcome {
        if self.root.as_deref().is_some_and(is_request_element) {
            return ParseOutcome::IsARequest;
        }
        if self.encrypted {
            return ParseOutcome::EncryptedResponse;
        }
        if let Some(recipient) = self.recipient.take() {
            SamlResponse::fill(&mut self.saml.acs, &recipient);
        }
        ParseOutcome::Success(self.saml)
    }

    fn open(&mut self, e: &BytesStart<'_>, mode: Mode) -> Result<String> {
        let name = local_name(e.name().as_ref());
        if self.stack.is_empty() {
            if self.root.is_some() && mode == Mode::Strict {
                anyhow::bail!("Multiple root elements: <{}>", name);
            }
            self.root.get_or_insert_with(|| name.clone());
        }
        self.text.clear();

        let attrs = attributes(e, mode)?;
        let attr = |key: &str| attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());

        match name.as_str() {
            "Response" => {
                if let Some(destination) = attr("Destination") {
                    SamlResponse::fill(&mut self.saml.acs, destination);
                }
            }
            "EncryptedAssertion" => self.encrypted = true,
            "NameID" => {
                if let Some(format) = attr("Format") {
                    SamlResponse::fill(&mut self.saml.name_id_format, format);
                }
            }
            "SubjectConfirmationData" => {
                if let Some(recipient) = attr("Recipient") {
                    SamlResponse::fill(&mut self.recipient, recipient);
                }
            }
            "Attribute" => self.current_attribute = attr("Name").map(str::to_string),
            _ => {}
        }
        Ok(name)
    }

    fn close(&mut self, name: &str) {
        let text = std::mem::take(&mut self.text);
        match name {
            "Issuer" => SamlResponse::fill(&mut self.saml.issuer, &text),
            "NameID" => SamlResponse::fill(&mut self.saml.name_id, &text),
            "Audience" => SamlResponse::fill(&mut self.saml.audience, &text),
            "X509Certificate" => SamlResponse::fill(&mut self.saml.certificate, &text),
            "AttributeValue" => {
                let value = text.trim();
                if let (Some(attribute), false) = (&self.current_attribute, value.is_empty()) {
                    self.saml.push_attribute(attribute, value.to_string());
                }
            }
            "Attribute" => self.current_attribute = None,
            _ => {}
        }
    }
}

fn scan(xml: &str, mode: Mode) -> Result<Scan> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    if mode == Mode::Relaxed {
        reader.config_mut().check_end_names = false;
        reader.config_mut().allow_unmatched_ends = true;
    }

    let mut scan = Scan::default();
    loop {
        match reader.read_event() {
            Err(e) => anyhow::bail!("XML parse error at position {}: {}", reader.error_position(), e),
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let name = scan.open(&e, mode)?;
                scan.stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = scan.open(&e, mode)?;
                scan.close(&name);
            }
            Ok(Event::End(_)) => match scan.stack.pop() {
                Some(name) => scan.close(&name),
                None if mode == Mode::Strict => anyhow::bail!("Unexpected closing tag"),
                None => {}
            },
            Ok(Event::Text(t)) => {
                let text = match mode {
                    Mode::Strict => t.unescape().context("Invalid character reference")?,
                    Mode::Relaxed => t
                        .unescape()
                        .unwrap_or_else(|_| Cow::Owned(String::from_utf8_lossy(&t).into_owned())),
                };
                if scan.stack.is_empty() {
                    if mode == Mode::Strict && !text.trim().is_empty() {
                        anyhow::bail!("Text outside of the root element");
                    }
                    continue;
                }
                scan.text.push_str(&text);
            }
            Ok(Event::CData(c)) => {
                scan.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            _ => {}
        }
    }

    if scan.root.is_none() {
        anyhow::bail!("No root element found");
    }
    if mode == Mode::Strict {
        if let Some(open) = scan.stack.last() {
            anyhow::bail!("Unclosed element <{}> at end of input", open);
        }
    }
    Ok(scan)
}

fn attributes(e: &BytesStart<'_>, mode: Mode) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = match (attr, mode) {
            (Ok(a), _) => a,
            (Err(err), Mode::Strict) => return Err(err).context("Malformed attribute"),
            (Err(_), Mode::Relaxed) => continue,
        };
        let value = match (attr.unescape_value(), mode) {
            (Ok(v), _) => v.into_owned(),
            (Err(err), Mode::Strict) => return Err(err).context("Invalid attribute value"),
            (Err(_), Mode::Relaxed) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        attrs.push((local_name(attr.key.as_ref()), value));
    }
    Ok(attrs)
}
