use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown element family: {name}")]
    UnknownFamily { name: String },
    #[error("invalid import options: {0}")]
    Options(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
