//! Cache Key Module
//!
//! Derives deterministic lookup keys from (prompt, model, options) requests.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

// == Cache Key ==
/// Hex-encoded SHA-256 digest identifying a request.
///
/// The digest depends only on its inputs, so keys derived in one process
/// match keys derived in another. Snapshots rely on that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    // == Derive ==
    /// Computes the key for a request.
    ///
    /// Object keys inside `options` are serialized in sorted order, so two
    /// option maps with the same contents always produce the same key.
    /// Missing options hash the same as an explicit JSON `null`.
    ///
    /// Each component is length-prefixed, so no choice of bytes inside a
    /// prompt or model tag can shift the boundary between components.
    pub fn derive(prompt: &str, model: &str, options: Option<&Value>) -> Self {
        let options = options.unwrap_or(&Value::Null).to_string();

        let mut hasher = Sha256::new();
        for component in [model, prompt, options.as_str()] {
            hasher.update((component.len() as u64).to_le_bytes());
            hasher.update(component.as_bytes());
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Returns the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
