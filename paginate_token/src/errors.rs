use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token is not valid base64")]
    InvalidEncoding,

    #[error("Token exceeds maximum size of {max} bytes")]
    TooLarge { max: usize },

    #[error("Token failed to decrypt")]
    Decrypt,

    #[error("Token encryption failed")]
    Encrypt,

    #[error("Token payload is malformed: {0}")]
    Payload(String),
}
