use crate::body::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneLoadError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("Body {0:?} is referenced but not defined")]
    UnknownBody(String),
    #[error("Body index {0} is referenced but not defined")]
    UnknownIndex(usize),
    #[error("Body name {0:?} is used more than once")]
    DuplicateName(String),
    #[error("Magnification must be a positive number, got {0}")]
    InvalidMagnification(f64),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
