use sitelink_core::error::CoreError;
use sitelink_db::StoreError;

/// Errors returned by the service layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<StoreError> for ServiceError {
    /// Constraint violations reported by the store surface as domain errors.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Core(core) => ServiceError::Core(core),
            other => ServiceError::Store(other),
        }
    }
}
