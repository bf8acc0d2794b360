use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("{0}")]
    Engine(#[from] engine::EngineError),
    #[error("identity error: {0}")]
    Auth(#[from] engine::AuthError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown timezone \"{0}\"")]
    Timezone(String),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("terminal error: {0}")]
    Terminal(String),
}
