use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Catalog API {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed catalog response: {0}")]
    Decode(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VaultError>;
