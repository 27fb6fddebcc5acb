//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - `Deserialize` DTOs for the write operations the entity supports
//! - Where the entity has a table listing, a `FromRow` table row that
//!   flattens into the positional layout the admin UI consumes

pub mod campaign;
pub mod list;
pub mod namespace;
pub mod share;
pub mod user;
