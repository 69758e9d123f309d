use std::io;
use thiserror::Error;

/// Everything that can stop a knock session.
///
/// Every variant is terminal: nothing is retried and the session stops at the
/// first error it sees.
#[derive(Debug, Error)]
pub enum KnockError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("dial fail: {0}")]
    Dial(#[source] io::Error),
    #[error("tx fail: {0}")]
    Transmit(#[source] io::Error),
    #[error("close fail: {0}")]
    Close(#[source] io::Error),
}

/// Invalid or unusable knock parameters, detected before any network activity.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("port sequence empty")]
    EmptySequence,
    #[error("offset should be between 0 and 65535, got {0}")]
    OffsetOutOfRange(i64),
    #[error("invalid port \"{token}\": {reason}")]
    InvalidPort { token: String, reason: String },
    #[error("invalid knock type \"{0}\"")]
    InvalidKnockType(String),
    #[error("invalid protocol \"{0}\"")]
    InvalidProtocol(String),
    #[error("invalid interval \"{value}\": {reason}")]
    InvalidInterval { value: String, reason: String },
    #[error("profile \"{0}\" not found")]
    UnknownProfile(String),
    #[error("no config directory available for the default profiles file")]
    NoConfigDir,
    #[error("config file {path}: {reason}")]
    File { path: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unable to resolve remote IP")]
    RemoteUnresolved,
    #[error("unable to resolve \"{host}\": {source}")]
    Lookup {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("no {family} address for \"{host}\"")]
    NoAddress { host: String, family: &'static str },
}
