pub type RemixResult<T> = Result<T, RemixError>;

#[derive(thiserror::Error, Debug)]
pub enum RemixError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("probe error: {0}")]
    Probe(String),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("engine error: {0}")]
    Engine(String),

    #[error("segmentation error: {0}")]
    Segmentation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RemixError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    pub fn segmentation(msg: impl Into<String>) -> Self {
        Self::Segmentation(msg.into())
    }
}
