use std::path::PathBuf;

use sparkfield_platform::EventChannel;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read preset file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse preset: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize preset: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
    #[error("invalid preset: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("no drawable surface attached")]
    MissingSurface,
    #[error("host refused {channel:?} subscription: {reason}")]
    Subscribe {
        channel: EventChannel,
        reason: String,
    },
}
