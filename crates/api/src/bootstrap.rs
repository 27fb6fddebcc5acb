//! First-start provisioning.

use campaigner_core::roles::ROLE_ADMIN;
use campaigner_db::models::user::CreateUser;
use campaigner_db::repositories::UserRepo;
use campaigner_db::DbPool;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};

/// Username of the bootstrapped administrator.
pub const ADMIN_USERNAME: &str = "admin";

/// Create the `admin` account with `password` unless it already exists.
///
/// Returns whether an account was created.
pub async fn ensure_admin_user(pool: &DbPool, password: &str) -> AppResult<bool> {
    if UserRepo::find_by_username(pool, ADMIN_USERNAME)
        .await?
        .is_some()
    {
        return Ok(false);
    }

    let password_hash = hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: ADMIN_USERNAME.to_string(),
            email: "admin@localhost".to_string(),
            password_hash,
            role: ROLE_ADMIN.to_string(),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "Created bootstrap admin account");
    Ok(true)
}
