//! Visitor id derivation.

use sha2::{Digest, Sha256};

/// Minimum length of a user id before a visitor id is derived from it.
const MIN_USER_ID_LEN: usize = 4;

/// Derive the 16-character hexadecimal visitor id for a user id.
///
/// The collector requires the visitor id to be exactly 16 hex characters and
/// stable for the lifetime of the user; deriving it from the user id gives
/// the same visitor across installations. Returns `None` for user ids
/// shorter than 4 bytes, which carry too little identity to digest.
pub fn visitor_id_for_user(user_id: &str) -> Option<String> {
    if user_id.len() < MIN_USER_ID_LEN {
        return None;
    }

    let digest = Sha256::digest(user_id.as_bytes());
    let mut id = String::with_capacity(16);
    for byte in &digest[..8] {
        id.push_str(&format!("{byte:02x}"));
    }
    Some(id)
}
