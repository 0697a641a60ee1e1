use serde::Deserialize;
use tracing::debug;

use crate::error::InputError;

const SAML_RESPONSE_PARAM: &str = "SAMLResponse";

#[derive(Debug, Deserialize)]
struct Har {
    log: HarLog,
}

#[derive(Debug, Deserialize)]
struct HarLog {
    #[serde(default)]
    entries: Vec<HarEntry>,
}

#[derive(Debug, Deserialize)]
struct HarEntry {
    request: HarRequest,
}

#[derive(Debug, Deserialize)]
struct HarRequest {
    #[serde(default)]
    url: String,
    #[serde(rename = "postData")]
    post_data: Option<PostData>,
}

#[derive(Debug, Deserialize)]
struct PostData {
    #[serde(default)]
    params: Vec<Param>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Param {
    name: String,
    #[serde(default)]
    value: String,
}

/// Find the first base64 `SAMLResponse` posted in a HAR capture.
pub fn extract_saml_response(raw: &str) -> Result<String, InputError> {
    let har: Har = serde_json::from_str(raw)?;

    for entry in &har.log.entries {
        let Some(post) = entry.request.post_data.as_ref() else {
            continue;
        };
        if let Some(value) = find_in_params(&post.params).or_else(|| find_in_body(post)) {
            debug!(url = %entry.request.url, "found SAMLResponse in HAR entry");
            return Ok(percent_decode(&value));
        }
    }

    Err(InputError::HarNoSamlResponse)
}

fn find_in_params(params: &[Param]) -> Option<String> {
    params
        .iter()
        .find(|p| p.name == SAML_RESPONSE_PARAM && !p.value.is_empty())
        .map(|p| p.value.clone())
}

fn find_in_body(post: &PostData) -> Option<String> {
    let text = post.text.as_deref()?;
    text.split('&').find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name == SAML_RESPONSE_PARAM && !value.is_empty()).then(|| value.to_string())
    })
}

fn percent_decode(value: &str) -> String {
    match urlencoding::decode(value) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn har_with_post(post_data: &str) -> String {
        format!(
            r#"{{"log": {{"version": "1.2", "entries": [
                {{"request": {{"method": "GET", "url": "https://idp.example.com/login"}}}},
                {{"request": {{"method": "POST", "url": "https://sp.example.com/acs", "postData": {post_data}}}}}
            ]}}}}"#
        )
    }

    #[test]
    fn extracts_from_params() {
        let har = har_with_post(
            r#"{"mimeType": "application/x-www-form-urlencoded",
                "params": [{"name": "RelayState", "value": "abc"},
                           {"name": "SAMLResponse", "value": "PFJlc3BvbnNlLz4%3D"}]}"#,
        );
        assert_eq!(extract_saml_response(&har).unwrap(), "PFJlc3BvbnNlLz4=");
    }

    #[test]
    fn extracts_from_form_body() {
        let har = har_with_post(
            r#"{"mimeType": "application/x-www-form-urlencoded",
                "text": "RelayState=abc&SAMLResponse=PGE%2BPzwvYT4%3D"}"#,
        );
        assert_eq!(extract_saml_response(&har).unwrap(), "PGE+PzwvYT4=");
    }

    #[test]
    fn capture_without_response_is_an_error() {
        let har = har_with_post(r#"{"params": [{"name": "RelayState", "value": "abc"}]}"#);
        let err = extract_saml_response(&har).unwrap_err();
        assert!(matches!(err, InputError::HarNoSamlResponse));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = extract_saml_response("{not json").unwrap_err();
        assert!(matches!(err, InputError::Har(_)));
    }
}
