use thiserror::Error;

/// Persistence failures surfaced by repositories.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The row changed or vanished between load and save.
    #[error("{entity} {id} was modified concurrently")]
    Conflict { entity: &'static str, id: i32 },
    #[error("database error: {0}")]
    Db(String),
}

impl From<sea_orm::DbErr> for RepoError {
    fn from(e: sea_orm::DbErr) -> Self { RepoError::Db(e.to_string()) }
}

impl From<models::errors::ModelError> for RepoError {
    fn from(e: models::errors::ModelError) -> Self { RepoError::Db(e.to_string()) }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// A concurrency conflict on a row that still exists; not recoverable here.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: i32) -> Self { Self::NotFound(format!("{} {} not found", entity, id)) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 1001,
            ServiceError::InvalidQuery(_) => 1002,
            ServiceError::NotFound(_) => 1003,
            ServiceError::Conflict(_) => 1101,
            ServiceError::Db(_) => 1200,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict { .. } => ServiceError::Conflict(e.to_string()),
            RepoError::Db(msg) => ServiceError::Db(msg),
        }
    }
}
