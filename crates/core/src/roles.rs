//! Well-known global role name constants.
//!
//! These must match the `CHECK` constraint on `users.role` in
//! `20261016000001_create_users_and_namespaces.sql`.

/// Bypasses every share check.
pub const ROLE_ADMIN: &str = "admin";
/// Regular user; access is granted only through shares.
pub const ROLE_USER: &str = "user";

/// All valid global roles.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_USER];
