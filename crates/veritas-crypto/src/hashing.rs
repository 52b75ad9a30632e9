use veritas_core::Bytes32;

/// BLAKE3 hash (32 bytes).
pub type Hash = [u8; 32];

/// Hash arbitrary data using BLAKE3.
pub fn hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Content hash of a byte string as a [`Bytes32`].
///
/// This is the binding used for credential metadata, proof blobs and
/// public-input vectors.
pub fn content_hash(data: &[u8]) -> Bytes32 {
    Bytes32(hash(data))
}

/// Domain-separated hash over several fields.
///
/// Input framing: `domain || 0x00 || (len_be64 || part)*`. Length prefixes
/// keep adjacent fields from sliding into each other, and the domain tag
/// keeps different id spaces apart.
pub fn hash_parts(domain: &str, parts: &[&[u8]]) -> Bytes32 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(domain.as_bytes());
    hasher.update(&[0u8]);
    for part in parts {
        hasher.update(&(part.len() as u64).to_be_bytes());
        hasher.update(part);
    }
    Bytes32(*hasher.finalize().as_bytes())
}

/// Compute the Merkle root of a list of leaves.
/// Returns the zero hash for an empty input and the leaf itself for a
/// single leaf. An odd node at any level is paired with itself.
pub fn merkle_root(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return [0u8; 32];
    }

    let mut level: Vec<Hash> = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let right = pair.get(1).unwrap_or(&pair[0]);
                let mut hasher = blake3::Hasher::new();
                hasher.update(&pair[0]);
                hasher.update(right);
                *hasher.finalize().as_bytes()
            })
            .collect();
    }

    level[0]
}
