use tracing::debug;

use crate::decode::{decode, InputType};
use crate::error::InputError;
use crate::orchestrator::ParseOrchestrator;
use crate::report::DiagnosticReport;

/// Decode raw input and build its diagnostic report.
///
/// Decoding errors are returned unchanged; everything after decoding ends up
/// in the report.
pub fn read(
    raw: &str,
    input_type: InputType,
    orchestrator: &ParseOrchestrator,
) -> Result<DiagnosticReport, InputError> {
    let xml = decode(input_type, raw)?;
    debug!(%input_type, bytes = xml.len(), "decoded input");
    let resolution = orchestrator.resolve(&xml);
    Ok(DiagnosticReport::from_resolution(resolution))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::ParserTier;
    use crate::report::{ENCRYPTED_ADVISORY, REQUEST_ADVISORY};

    const RESPONSE_XML: &str = include_str!("../tests/fixtures/response.xml");
    const RESPONSE_B64: &str = include_str!("../tests/fixtures/response.b64");
    const REQUEST_XML: &str = include_str!("../tests/fixtures/request.xml");
    const ENCRYPTED_HAR: &str = include_str!("../tests/fixtures/encrypted.har");
    const ENCRYPTED_XML: &str = include_str!("../tests/fixtures/encrypted.xml");
    const TRUNCATED_XML: &str = include_str!("../tests/fixtures/truncated.xml");
    const NO_CERT_XML: &str = include_str!("../tests/fixtures/no_cert.xml");

    fn report(raw: &str, input_type: InputType) -> DiagnosticReport {
        read(raw, input_type, &ParseOrchestrator::default()).unwrap()
    }

    #[test]
    fn base64_response_with_certificate() {
        let report = report(RESPONSE_B64, InputType::Base64);
        assert!(report.saml_is_valid());
        assert!(report.cert_is_valid());
        assert!(report.errors().is_empty());
        assert_eq!(report.parser_tier(), ParserTier::Strict);
    }

    #[test]
    fn xml_request_is_rejected() {
        let report = report(REQUEST_XML, InputType::Xml);
        assert!(!report.saml_is_valid());
        assert!(!report.cert_is_valid());
        assert_eq!(report.errors(), [REQUEST_ADVISORY.to_string()]);
    }

    #[test]
    fn har_with_encrypted_assertion() {
        let report = report(ENCRYPTED_HAR, InputType::Har);
        assert!(!report.saml_is_valid());
        assert!(!report.cert_is_valid());
        assert_eq!(report.errors(), [ENCRYPTED_ADVISORY.to_string()]);
    }

    #[test]
    fn encrypted_report_is_stable_across_runs() {
        let first = report(ENCRYPTED_XML, InputType::Xml);
        let second = report(ENCRYPTED_XML, InputType::Xml);
        assert_eq!(first, second);
    }

    #[test]
    fn truncated_xml_falls_back_to_regex() {
        let report = report(TRUNCATED_XML, InputType::Xml);
        assert!(report.saml_is_valid());
        assert_eq!(report.parser_tier(), ParserTier::Regex);
        assert!(report.errors()[0].contains("fallback 'regex' parser"));
        assert!(!report.cert_is_valid());
    }

    #[test]
    fn base64_and_xml_inputs_agree() {
        assert_eq!(
            report(RESPONSE_B64, InputType::Base64),
            report(RESPONSE_XML, InputType::Xml)
        );
    }

    #[test]
    fn missing_certificate_is_soft_error() {
        let report = report(NO_CERT_XML, InputType::Xml);
        assert!(report.saml_is_valid());
        assert!(!report.cert_is_valid());
        assert_eq!(report.errors().len(), 1);
        assert!(report.errors()[0].starts_with("Could not locate certificate"));
    }

    #[test]
    fn cert_never_valid_without_saml() {
        let inputs = [
            (RESPONSE_XML, InputType::Xml),
            (REQUEST_XML, InputType::Xml),
            (ENCRYPTED_XML, InputType::Xml),
            (TRUNCATED_XML, InputType::Xml),
            (NO_CERT_XML, InputType::Xml),
            ("plain text", InputType::Xml),
        ];
        for (raw, input_type) in inputs {
            let report = report(raw, input_type);
            assert!(!report.cert_is_valid() || report.saml_is_valid());
        }
    }

    #[test]
    fn decode_failure_is_returned_not_reported() {
        let err = read("%%%", InputType::Base64, &ParseOrchestrator::default()).unwrap_err();
        assert!(matches!(err, InputError::Base64(_)));
    }
}
