#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("no base URL configured")]
    MissingBaseUrl,

    #[error("invalid base URL: {0}")]
    BaseUrlParse(#[from] url::ParseError),

    #[error("base URL cannot carry request paths: {0}")]
    BaseUrlNotABase(String),

    #[error("failed to construct transport: {0}")]
    Transport(String),
}
