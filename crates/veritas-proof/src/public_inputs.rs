use serde::{Deserialize, Serialize};

use veritas_core::Bytes32;
use veritas_crypto::content_hash;

use crate::error::ProofError;
use crate::field::FieldElement;

pub const MERKLE_ROOT_INDEX: usize = 0;
pub const MIN_CREDENTIALS_INDEX: usize = 1;
pub const CRITERIA_HASH_INDEX: usize = 2;
pub const BINDING_INDEX: usize = 3;

/// Number of leading inputs with a fixed meaning.
pub const REQUIRED_PUBLIC_INPUTS: usize = 4;

/// A proof's public-input vector.
///
/// The first four entries echo the request's merkle root, minimum credential
/// count and criteria hash, followed by a prover-specific binding value.
/// Circuits may append further inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldElement>", into = "Vec<FieldElement>")]
pub struct PublicInputs(Vec<FieldElement>);

impl PublicInputs {
    pub fn new(values: Vec<FieldElement>) -> Result<Self, ProofError> {
        if values.len() < REQUIRED_PUBLIC_INPUTS {
            return Err(ProofError::InsufficientPublicInputs {
                expected: REQUIRED_PUBLIC_INPUTS,
                actual: values.len(),
            });
        }
        Ok(Self(values))
    }

    /// Parse submitted hex strings.
    pub fn parse(raw: &[String]) -> Result<Self, ProofError> {
        let values = raw
            .iter()
            .map(|s| FieldElement::from_hex(s))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(values)
    }

    pub fn merkle_root(&self) -> FieldElement {
        self.0[MERKLE_ROOT_INDEX]
    }

    pub fn min_credentials(&self) -> FieldElement {
        self.0[MIN_CREDENTIALS_INDEX]
    }

    pub fn criteria_hash(&self) -> FieldElement {
        self.0[CRITERIA_HASH_INDEX]
    }

    pub fn binding(&self) -> FieldElement {
        self.0[BINDING_INDEX]
    }

    pub fn as_slice(&self) -> &[FieldElement] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex_strings(&self) -> Vec<String> {
        self.0.iter().map(FieldElement::to_hex).collect()
    }

    /// Concatenated 32-byte big-endian elements.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.iter().flat_map(|fe| fe.to_be_bytes()).collect()
    }

    /// Content hash of [`to_bytes`](Self::to_bytes); the public-inputs hash
    /// a submission must declare.
    pub fn content_hash(&self) -> Bytes32 {
        content_hash(&self.to_bytes())
    }
}

impl TryFrom<Vec<FieldElement>> for PublicInputs {
    type Error = ProofError;

    fn try_from(values: Vec<FieldElement>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<PublicInputs> for Vec<FieldElement> {
    fn from(inputs: PublicInputs) -> Self {
        inputs.0
    }
}
