// ABOUTME: Data URL parsing and encoding for image uploads
// ABOUTME: Accepts data:<mime>;base64,<payload> strings and bare base64
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::IngestionError;

/// A parsed base64 data URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    mime_type: Option<String>,
    payload: String,
}

impl DataUrl {
    /// Parse a data URL, or a bare base64 payload without header
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or the header is not a base64 data URL
    pub fn parse(input: &str) -> Result<Self, IngestionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(IngestionError::EmptyPayload);
        }

        let (mime_type, payload) = match trimmed.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',').ok_or_else(|| {
                    IngestionError::MalformedDataUrl("missing ',' separator".to_owned())
                })?;
                let mime = header.strip_suffix(";base64").ok_or_else(|| {
                    IngestionError::MalformedDataUrl(
                        "only base64-encoded data URLs are supported".to_owned(),
                    )
                })?;
                ((!mime.is_empty()).then(|| mime.to_owned()), payload)
            }
            None => (None, trimmed),
        };

        if payload.trim().is_empty() {
            return Err(IngestionError::EmptyPayload);
        }

        Ok(Self {
            mime_type,
            payload: payload.to_owned(),
        })
    }

    /// Build a data URL string from raw bytes
    #[must_use]
    pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
        format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
    }

    /// Declared MIME type, when the input had a header
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Decode the payload, ignoring embedded whitespace
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid base64
    pub fn decode(&self) -> Result<Vec<u8>, IngestionError> {
        let compact: String = self
            .payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        Ok(STANDARD.decode(compact)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_url_with_header() {
        let url = DataUrl::parse("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(url.mime_type(), Some("image/png"));
        assert_eq!(url.decode().unwrap(), b"hello");
    }

    #[test]
    fn test_parse_bare_base64() {
        let url = DataUrl::parse("aGVs\nbG8=").unwrap();
        assert_eq!(url.mime_type(), None);
        assert_eq!(url.decode().unwrap(), b"hello");
    }

    #[test]
    fn test_encode_then_parse() {
        let encoded = DataUrl::encode("image/jpeg", &[1, 2, 3]);
        assert!(encoded.starts_with("data:image/jpeg;base64,"));
        assert_eq!(DataUrl::parse(&encoded).unwrap().decode().unwrap(), [1, 2, 3]);
    }

    #[test]
    fn test_rejects_empty_and_malformed() {
        assert!(matches!(
            DataUrl::parse("   "),
            Err(IngestionError::EmptyPayload)
        ));
        assert!(matches!(
            DataUrl::parse("data:image/png;base64,"),
            Err(IngestionError::EmptyPayload)
        ));
        assert!(matches!(
            DataUrl::parse("data:image/png;base64"),
            Err(IngestionError::MalformedDataUrl(_))
        ));
        assert!(matches!(
            DataUrl::parse("data:text/plain,hello"),
            Err(IngestionError::MalformedDataUrl(_))
        ));
        assert!(matches!(
            DataUrl::parse("not*base64!").unwrap().decode(),
            Err(IngestionError::InvalidBase64(_))
        ));
    }
}
