use serde::{Deserialize, Serialize};

/// Seven days, the default validity window for verification requests.
pub const DEFAULT_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;

/// How far replay protection reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayScope {
    /// A proof hash may be accepted once per request.
    #[default]
    PerRequest,
    /// A proof hash may be accepted once across all requests.
    Global,
}

/// Genesis configuration for a registry and verification protocol pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Collection name reported by the registry.
    #[serde(default = "default_token_name")]
    pub token_name: String,
    /// Collection symbol reported by the registry.
    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,
    /// Expiry window applied to requests created with `expiry_time == 0`.
    #[serde(default = "default_expiry_secs")]
    pub default_expiry_secs: u64,
    /// Initial value of the global submission kill switch.
    #[serde(default = "default_true")]
    pub verification_enabled: bool,
    /// Replay-protection scope for proof hashes.
    #[serde(default)]
    pub replay_scope: ReplayScope,
}

fn default_token_name() -> String {
    "Veritas Soulbound Token".into()
}
fn default_token_symbol() -> String {
    "VSBT".into()
}
fn default_expiry_secs() -> u64 {
    DEFAULT_EXPIRY_SECS
}
fn default_true() -> bool {
    true
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            token_name: default_token_name(),
            token_symbol: default_token_symbol(),
            default_expiry_secs: default_expiry_secs(),
            verification_enabled: true,
            replay_scope: ReplayScope::PerRequest,
        }
    }
}
