//! ID generation for lists and items
//!
//! Format: <prefix>-xxxxxxxx (8 lowercase Crockford base32 chars)

use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const LIST_PREFIX: &str = "list";
pub const ITEM_PREFIX: &str = "item";

const ID_LEN: usize = 8;

/// Generate a unique entity ID
///
/// Uses UUID + timestamp hash, encoded as base32 lowercase.
pub fn generate_id(prefix: &str) -> String {
    let uuid = Uuid::new_v4();
    let timestamp = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0);

    let mut hasher = Sha256::new();
    hasher.update(uuid.as_bytes());
    hasher.update(timestamp.to_le_bytes());

    let hash = hasher.finalize();

    // 5 bytes encode to exactly 8 base32 chars
    let encoded = base32::encode(base32::Alphabet::Crockford, &hash[..5])
        .to_lowercase()
        .chars()
        .take(ID_LEN)
        .collect::<String>();

    format!("{}-{}", prefix, encoded)
}

/// Split an ID into prefix and hash
pub fn parse_id(id: &str) -> Option<(&str, &str)> {
    id.split_once('-')
}

/// Accept either a full ID or just its hash part
///
/// `qualify("item", "abcd1234")` and `qualify("item", "item-abcd1234")`
/// both yield `item-abcd1234`.
pub fn qualify(prefix: &str, raw: &str) -> String {
    match parse_id(raw) {
        Some((p, _)) if p == prefix => raw.to_string(),
        _ => format!("{}-{}", prefix, raw),
    }
}
