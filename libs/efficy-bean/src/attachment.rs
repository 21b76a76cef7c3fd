//! Attachment payload codec.
//!
//! Downloads carry the file either as a base64 string (optionally as a `data:` URI) or
//! as an array of byte values. Uploads always send base64.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use serde_json::Value;
use thiserror::Error;

use crate::field::FieldRef;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachmentCodecError {
    #[error("attachment content is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("attachment byte array has a non-byte entry at index {index}")]
    InvalidByte { index: usize },

    #[error("attachment content is missing")]
    Missing,
}

/// Wire form of an attachment body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentPayload {
    Base64(String),
    Bytes(Vec<u8>),
}

/// Decoded attachment with its size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAttachment {
    pub bytes: Vec<u8>,
    /// Declared size when the record carried one, otherwise an estimate.
    pub size: u64,
    pub size_estimated: bool,
}

impl AttachmentPayload {
    /// Read a payload from raw JSON: a string is base64, an array holds byte values.
    ///
    /// # Errors
    /// Returns an error when the value is neither, or an array entry is not a byte.
    pub fn from_json(value: &Value) -> Result<Self, AttachmentCodecError> {
        match value {
            Value::String(text) => Ok(Self::Base64(text.clone())),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    item.as_u64()
                        .and_then(|n| u8::try_from(n).ok())
                        .ok_or(AttachmentCodecError::InvalidByte { index })
                })
                .collect::<Result<Vec<u8>, _>>()
                .map(Self::Bytes),
            _ => Err(AttachmentCodecError::Missing),
        }
    }

    /// Read a payload from a normalized bean field. Lists are byte values in text form.
    ///
    /// # Errors
    /// Returns an error when a list entry is not a byte.
    pub fn from_field(field: FieldRef<'_>) -> Result<Self, AttachmentCodecError> {
        match field {
            FieldRef::Text(text) => Ok(Self::Base64(text.to_owned())),
            FieldRef::List(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    item.trim()
                        .parse::<u8>()
                        .map_err(|_| AttachmentCodecError::InvalidByte { index })
                })
                .collect::<Result<Vec<u8>, _>>()
                .map(Self::Bytes),
        }
    }

    /// Size without decoding: exact for byte arrays, `ceil(len * 3 / 4)` for base64.
    #[must_use]
    pub fn estimated_size(&self) -> u64 {
        let len = match self {
            Self::Bytes(bytes) => bytes.len(),
            Self::Base64(text) => (strip_data_uri(text).len() * 3).div_ceil(4),
        };
        u64::try_from(len).unwrap_or(u64::MAX)
    }

    /// Decode to bytes. A `declared_size` wins over the estimate.
    ///
    /// # Errors
    /// Returns an error when the base64 text cannot be decoded.
    pub fn decode(
        self,
        declared_size: Option<u64>,
    ) -> Result<DecodedAttachment, AttachmentCodecError> {
        let estimate = self.estimated_size();
        let bytes = match self {
            Self::Bytes(bytes) => bytes,
            Self::Base64(text) => decode_base64(&text)?,
        };

        Ok(DecodedAttachment {
            bytes,
            size: declared_size.unwrap_or(estimate),
            size_estimated: declared_size.is_none(),
        })
    }
}

/// Base64 text sent in create/update bodies.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

fn decode_base64(text: &str) -> Result<Vec<u8>, AttachmentCodecError> {
    let compact: String = strip_data_uri(text)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    STANDARD
        .decode(&compact)
        .or_else(|_| STANDARD_NO_PAD.decode(&compact))
        .map_err(|e| AttachmentCodecError::InvalidBase64(e.to_string()))
}

/// `data:<mime>;base64,<payload>` → `<payload>`.
fn strip_data_uri(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.starts_with("data:") {
        trimmed
            .split_once(',')
            .map_or(trimmed, |(_, payload)| payload)
    } else {
        trimmed
    }
}
