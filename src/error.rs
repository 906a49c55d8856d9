use crate::coordinate::GridCoordinate;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("operation on an empty container")]
    EmptyContainer,

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Walking the predecessor chain came back to a cell already visited
    /// during the same walk.
    #[error("cycle detected in predecessor chain at {at:?}")]
    CycleDetected { at: GridCoordinate },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
