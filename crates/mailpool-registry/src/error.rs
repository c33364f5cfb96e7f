use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("registry returned {status} for {endpoint}: {body}")]
    Api {
        status: u16,
        endpoint: String,
        body: String,
    },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
