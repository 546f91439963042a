use thiserror::Error;

#[derive(Error, Debug)]
pub enum CadenceError {
    #[error("Sensor unavailable: {0}")]
    SensorUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Recording line {line}: {reason}")]
    Recording { line: usize, reason: String },

    #[error("Failed to parse configuration file: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CadenceError>;
