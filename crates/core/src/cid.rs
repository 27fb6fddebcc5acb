//! Public short identifiers (`cid`) for lists and campaigns.
//!
//! A cid appears in subscription URLs, so it is short, URL-safe, and not
//! derived from the internal primary key.

use rand::distr::Alphanumeric;
use rand::Rng;

/// Length of a generated cid.
pub const CID_LENGTH: usize = 10;

/// Generate a new random cid.
pub fn generate() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CID_LENGTH)
        .map(char::from)
        .collect()
}
