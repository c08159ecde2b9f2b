//! Stable keys for memoised results.

use std::hash::{DefaultHasher, Hash, Hasher};

use serde::Serialize;

/// Compute a hex key for a parameter object.
///
/// The object is serialised to JSON first so that any `Serialize` type can be
/// used as a key. Field order follows the type's declaration order, so use
/// ordered maps (not `HashMap`) inside parameter objects.
pub fn params_key<P: Serialize + ?Sized>(params: &P) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(params)?;
    Ok(content_hash_str(&json))
}

/// Compute hash from a string.
/// Uses DefaultHasher for speed (non-cryptographic, fast).
pub fn content_hash_str(content: &str) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
