//! Content fingerprints used for optimistic concurrency checks.
//!
//! An entity hash is computed from the entity's mutable fields only. The API
//! hands the hash out with every read, and an update must send it back as
//! `original_hash`; a mismatch means someone else wrote the row in between.

use std::collections::BTreeMap;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::CoreError;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Compute the stable fingerprint of an entity's hashed fields.
///
/// `fields` must serialize to a JSON object. Keys are sorted before
/// hashing so the result does not depend on struct field order.
pub fn entity_hash<T: Serialize>(fields: &T) -> Result<String, CoreError> {
    let value = serde_json::to_value(fields)
        .map_err(|e| CoreError::Internal(format!("Failed to serialize entity for hashing: {e}")))?;

    let serde_json::Value::Object(map) = value else {
        return Err(CoreError::Internal(
            "Entity hash input must serialize to an object".into(),
        ));
    };

    let canonical: BTreeMap<String, serde_json::Value> = map.into_iter().collect();
    let encoded = serde_json::to_vec(&canonical)
        .map_err(|e| CoreError::Internal(format!("Failed to encode entity hash input: {e}")))?;

    Ok(sha256_hex(&encoded))
}
