use thiserror::Error;

#[derive(Debug, Error)]
pub enum SightlineError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Image error: {0}")]
    Image(String),
}

impl From<SightlineError> for String {
    fn from(err: SightlineError) -> Self {
        err.to_string()
    }
}
