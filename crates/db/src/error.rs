use campaigner_core::error::CoreError;

/// Error returned by repository operations that enforce domain rules.
///
/// Plain CRUD helpers return [`sqlx::Error`] directly; operations that check
/// permissions, hashes, or enum ranges inside a transaction return this so
/// the caller can tell a rule violation from a database failure.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl From<validator::ValidationErrors> for RepoError {
    fn from(errors: validator::ValidationErrors) -> Self {
        RepoError::Core(CoreError::Validation(errors.to_string()))
    }
}
