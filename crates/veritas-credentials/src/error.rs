use veritas_core::{Address, CoreError, ErrorKind, TokenId};

/// Credential registry errors.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("not a whitelisted issuer: {0}")]
    NotWhitelistedIssuer(Address),

    #[error("caller {0} is not the registry administrator")]
    NotAdmin(Address),

    #[error("credential not found: {0}")]
    CredentialNotFound(TokenId),

    #[error("invalid recipient address")]
    InvalidRecipient,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("metadata hash must be non-zero")]
    InvalidMetadataHash,

    #[error("credential type must not be empty")]
    EmptyCredentialType,

    #[error("credential {0} is already revoked")]
    AlreadyRevoked(TokenId),

    #[error("soulbound tokens cannot be transferred")]
    SoulboundTransfer,

    #[error("soulbound tokens cannot be approved")]
    SoulboundApproval,

    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

impl CredentialError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotWhitelistedIssuer(_)
            | Self::NotAdmin(_)
            | Self::SoulboundTransfer
            | Self::SoulboundApproval => ErrorKind::Authorization,
            Self::CredentialNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyRevoked(_) => ErrorKind::State,
            Self::Core(e) => e.kind(),
            Self::InvalidRecipient
            | Self::InvalidAddress(_)
            | Self::InvalidMetadataHash
            | Self::EmptyCredentialType
            | Self::InvalidMetadata(_) => ErrorKind::Validation,
        }
    }
}
