use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 digest of `input`, matching the canonical-hash
/// idiom used for commandHash audit fields.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
