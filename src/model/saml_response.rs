use std::collections::BTreeMap;

use serde::Serialize;

/// Values extracted from a SAML response by one of the structural parsers.
///
/// Every field is optional: the regex parser in particular may only find a
/// handful of them in a damaged document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SamlResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_id_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    /// Assertion consumer service URL (`Destination`, or `Recipient` as a fallback)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acs: Option<String>,
    /// Base64 body of the first `X509Certificate` element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl SamlResponse {
    pub fn found_any_values(&self) -> bool {
        self.issuer.is_some()
            || self.name_id.is_some()
            || self.name_id_format.is_some()
            || self.audience.is_some()
            || self.acs.is_some()
            || self.certificate.is_some()
            || !self.attributes.is_empty()
    }

    pub fn certificate(&self) -> Option<&str> {
        self.certificate.as_deref()
    }

    /// Record an attribute value, keeping the order values appeared in.
    pub fn push_attribute(&mut self, name: &str, value: String) {
        self.attributes
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    /// Set a field only if it has not been seen yet; the first occurrence wins.
    pub(crate) fn fill(slot: &mut Option<String>, value: &str) {
        let value = value.trim();
        if slot.is_none() && !value.is_empty() {
            *slot = Some(value.to_string());
        }
    }
}
