//! Off-chain credential metadata carried inline as a data URI.
//!
//! The JSON document is serialized exactly once. The hash is taken over
//! those bytes and the URI embeds the same bytes, so hash and URI always
//! agree; decoding never re-serializes.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use veritas_core::{Address, Bytes32};
use veritas_crypto::content_hash;

use crate::error::CredentialError;

/// Prefix of an inline metadata URI.
pub const DATA_URI_PREFIX: &str = "data:application/json;base64,";

/// Current metadata document version.
pub const METADATA_VERSION: &str = "1.0";

/// Metadata document describing a credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialMetadata {
    pub description: String,
    /// Free-form issuer data. An empty object when nothing was supplied.
    pub additional_data: serde_json::Value,
    pub issuer: Address,
    /// Issuance time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub version: String,
}

/// A serialized metadata document with its hash and URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMetadata {
    pub json: String,
    pub hash: Bytes32,
    pub uri: String,
}

impl CredentialMetadata {
    pub fn new(
        description: impl Into<String>,
        additional_data: Option<serde_json::Value>,
        issuer: Address,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            description: description.into(),
            additional_data: additional_data
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            issuer,
            timestamp: issued_at.timestamp_millis(),
            version: METADATA_VERSION.to_string(),
        }
    }

    /// Issuance time, if the stored millisecond value is in range.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Serialize once and derive the hash and data URI from those bytes.
    pub fn encode(&self) -> Result<EncodedMetadata, CredentialError> {
        let json = serde_json::to_string(self)
            .map_err(|e| CredentialError::InvalidMetadata(e.to_string()))?;
        let hash = content_hash(json.as_bytes());
        let uri = format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(json.as_bytes()));
        Ok(EncodedMetadata { json, hash, uri })
    }
}

/// Recover the raw JSON bytes embedded in an inline metadata URI.
pub fn decode_metadata_uri(uri: &str) -> Result<Vec<u8>, CredentialError> {
    let payload = uri.strip_prefix(DATA_URI_PREFIX).ok_or_else(|| {
        CredentialError::InvalidMetadata(format!("not an inline metadata URI: {}", uri))
    })?;
    STANDARD
        .decode(payload)
        .map_err(|e| CredentialError::InvalidMetadata(e.to_string()))
}

/// Check an inline metadata URI against a metadata hash and return the
/// parsed document.
pub fn verify_metadata_uri(
    uri: &str,
    expected_hash: &Bytes32,
) -> Result<CredentialMetadata, CredentialError> {
    let bytes = decode_metadata_uri(uri)?;
    if content_hash(&bytes) != *expected_hash {
        return Err(CredentialError::InvalidMetadata(
            "metadata hash does not match URI content".into(),
        ));
    }
    serde_json::from_slice(&bytes).map_err(|e| CredentialError::InvalidMetadata(e.to_string()))
}
