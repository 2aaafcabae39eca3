use crate::binding::CommandId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeymapError {
    #[error("command declared twice: {0}")]
    DuplicateCommand(CommandId),

    #[error("command {0} has no contexts")]
    NoContexts(CommandId),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid override file: {0}")]
    Json(#[from] serde_json::Error),
}
