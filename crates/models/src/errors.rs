use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("connection error: {0}")]
    Connect(String),
    #[error("database error: {0}")]
    Db(String),
}

impl From<sea_orm::DbErr> for ModelError {
    fn from(e: sea_orm::DbErr) -> Self {
        match e {
            sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_) => ModelError::Connect(e.to_string()),
            other => ModelError::Db(other.to_string()),
        }
    }
}
