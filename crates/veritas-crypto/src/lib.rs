pub mod hashing;
pub mod ids;

pub use hashing::{content_hash, hash, hash_parts, merkle_root, Hash};
pub use ids::{derive_proof_id, derive_request_id, PROOF_ID_DOMAIN, REQUEST_ID_DOMAIN};
