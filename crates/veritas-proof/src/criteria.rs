use serde::Serialize;

use veritas_core::Bytes32;
use veritas_crypto::content_hash;

use crate::error::ProofError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Criteria<'a> {
    required_types: &'a [String],
    min_credentials: u64,
}

/// Commitment to a request's matching rules: BLAKE3 of
/// `{"requiredTypes":[...],"minCredentials":n}`.
///
/// The order of `required_types` is significant.
pub fn criteria_hash(required_types: &[String], min_credentials: u64) -> Result<Bytes32, ProofError> {
    let json = serde_json::to_vec(&Criteria {
        required_types,
        min_credentials,
    })
    .map_err(|e| ProofError::Serialization(e.to_string()))?;
    Ok(content_hash(&json))
}
