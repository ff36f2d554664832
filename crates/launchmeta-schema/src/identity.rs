use crate::types::ContentHash;
use serde::Serialize;

/// Blake3 digest of the canonical JSON rendering of `value`.
///
/// The value is routed through `serde_json::Value` first so map keys are
/// sorted and field declaration order never leaks into the hash.
pub fn content_hash<T: Serialize + ?Sized>(value: &T) -> Result<ContentHash, serde_json::Error> {
    let canonical = serde_json::to_value(value)?;
    let bytes = serde_json::to_vec(&canonical)?;
    Ok(ContentHash::new(blake3::hash(&bytes).to_hex().to_string()))
}

/// Blake3 digest of raw file content, as listed in package indexes.
pub fn file_hash(bytes: &[u8]) -> ContentHash {
    ContentHash::new(blake3::hash(bytes).to_hex().to_string())
}
