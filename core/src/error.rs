use thiserror::Error;

#[derive(Error, Debug)]
pub enum GpError {
    #[error("Platform error: {0}")]
    Platform(String),
    #[error("Inspector error: {0}")]
    Inspector(String),
    #[error("Overlay error: {0}")]
    Overlay(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Unknown error: {0}")]
    Unknown(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GpError>;
