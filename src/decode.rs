use std::fmt;
use std::str::FromStr;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde::Serialize;

use crate::error::InputError;
use crate::parsers::har;

/// Declared encoding of the raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Base64,
    Xml,
    Har,
}

impl FromStr for InputType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base64" => Ok(InputType::Base64),
            "xml" => Ok(InputType::Xml),
            "har" => Ok(InputType::Har),
            other => Err(InputError::InvalidInputType(other.to_string())),
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputType::Base64 => write!(f, "base64"),
            InputType::Xml => write!(f, "xml"),
            InputType::Har => write!(f, "har"),
        }
    }
}

// IdPs are inconsistent about trailing '=' padding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Turn raw input text into XML the structural parsers can read.
pub fn decode(input_type: InputType, raw: &str) -> Result<String, InputError> {
    match input_type {
        InputType::Xml => Ok(raw.to_string()),
        InputType::Base64 => decode_base64(raw),
        InputType::Har => decode_base64(&har::extract_saml_response(raw)?),
    }
}

pub fn decode_base64(data: &str) -> Result<String, InputError> {
    let mut compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.contains('%') {
        if let Ok(unescaped) = urlencoding::decode(&compact) {
            compact = unescaped.into_owned();
        }
    }
    let bytes = LENIENT.decode(compact.as_bytes())?;
    Ok(String::from_utf8(bytes)?)
}
