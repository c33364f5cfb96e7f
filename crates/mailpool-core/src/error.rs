use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("config not found at {0} (run 'mailpool config init' first)")]
    ConfigNotFound(String),

    #[error("unknown status '{0}'")]
    UnknownStatus(String),

    #[error("executor action failed: {0}")]
    Executor(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, PoolError>;
