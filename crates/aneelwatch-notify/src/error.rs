use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[cfg(feature = "smtp")]
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[cfg(feature = "smtp")]
    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[cfg(feature = "smtp")]
    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("{0}")]
    Other(String),
}
