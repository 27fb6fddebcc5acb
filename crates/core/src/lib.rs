//! Domain types and rules shared by the database and API crates.
//!
//! Nothing in this crate performs I/O.

pub mod campaigns;
pub mod cid;
pub mod error;
pub mod hashing;
pub mod lists;
pub mod permissions;
pub mod roles;
pub mod table;
pub mod types;
