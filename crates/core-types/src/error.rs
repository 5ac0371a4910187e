use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Unknown campaign input '{0}'")]
    UnknownField(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
