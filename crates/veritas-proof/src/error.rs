use veritas_core::ErrorKind;

/// Proof adapter errors.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    #[error("invalid field element: {0}")]
    InvalidFieldElement(String),

    #[error("malformed proof: {0}")]
    MalformedProof(String),

    #[error("invalid verification key: {0}")]
    InvalidVerificationKey(String),

    #[error("expected at least {expected} public inputs, got {actual}")]
    InsufficientPublicInputs { expected: usize, actual: usize },

    #[error("public input {index} ({name}) does not match the request")]
    PublicInputMismatch { index: usize, name: &'static str },

    #[error("no credentials provided")]
    NoCredentials,

    #[error("no required credential types specified")]
    NoRequiredTypes,

    #[error("insufficient matching credentials: required {required}, found {found}")]
    InsufficientCredentials { required: u64, found: u64 },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ProofError {
    /// Classify this error. Every proof error is a malformed or
    /// unsatisfiable input.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
