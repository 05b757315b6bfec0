use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaEngineError {
    #[error("unknown media engine event: {0}")]
    UnknownEvent(String),
    #[error("settings error: {0}")]
    Settings(String),
}
