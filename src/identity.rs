// identity.rs
use sha2::{Digest, Sha256};

/// Stable fingerprint of a raw participant identifier.
///
/// No salt: the votes table deduplicates on this value across requests and
/// process restarts, and the raw identifier is never stored.
pub fn hash_user_id(user_id: &str) -> String {
    hex::encode(Sha256::digest(user_id.as_bytes()))
}
