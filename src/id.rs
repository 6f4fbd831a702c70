//! ID generation for daylist tasks.

use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Hex digits in a task id, after the "dl-" prefix.
const ID_HEX_LEN: usize = 12;

/// Generate an opaque task id: "dl-" followed by 12 hex chars taken from
/// SHA256 over the task text, creation time, and a random nonce. Ids are
/// stable once assigned; the hash inputs only matter at creation.
pub fn generate_id(text: &str, created_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(created_at.timestamp_nanos_opt().unwrap_or(0).to_be_bytes());
    hasher.update(rand::rng().random::<u64>().to_be_bytes());
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();

    let mut id = String::with_capacity(3 + ID_HEX_LEN);
    id.push_str("dl-");
    for byte in &digest[..ID_HEX_LEN / 2] {
        write!(id, "{:02x}", byte).expect("writing to a String cannot fail");
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_format() {
        let id = generate_id("Water plants", Utc::now());
        assert!(id.starts_with("dl-"));
        assert_eq!(id.len(), 3 + ID_HEX_LEN);
        assert!(id[3..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_id_uniqueness() {
        let now = Utc::now();
        let id1 = generate_id("Same text", now);
        let id2 = generate_id("Same text", now);
        // The random nonce keeps identical inputs from colliding
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_generate_id_different_texts() {
        let now = Utc::now();
        let id1 = generate_id("Text one", now);
        let id2 = generate_id("Text two", now);
        assert_ne!(id1, id2);
    }
}
