use ::std::io;
use thiserror::Error;

/// Rejected configuration. Invalid values always fail before use,
/// they are never clamped.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("ngram bounds min={min} max={max} are invalid, requires 1 <= min <= max")]
    InvalidNgramBounds { min: usize, max: usize },
    #[error("truncation threshold {0} is not in range 0.0..=1.0")]
    InvalidTruncationThreshold(f64),
}

/// Failure of a single language training run.
#[derive(Error, Debug)]
pub enum TrainError {
    #[error("invalid training configuration")]
    Config(#[from] ConfigError),
    #[error("frequency counter overflow, ngram is too frequent in the corpus. Try to use a smaller corpus")]
    FrequencyOverflow,
    #[error("corpus read error")]
    Corpus(#[source] io::Error),
}

/// Failure to load or decode a persisted language model blob.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model file open error")]
    Open(#[source] io::Error),
    #[error("model read error")]
    Read(#[source] io::Error),
    #[error("not a gram tree model (bad magic)")]
    BadMagic,
    #[error("model version {found} is incompatible, please retrain the model")]
    UnsupportedVersion { found: u8 },
    #[error("model decode error")]
    Decode(#[source] io::Error),
    #[error("model failed validation: {0}")]
    Invalid(&'static str),
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("registry is sealed, use a mutable detector instance")]
    Sealed,
    #[error(transparent)]
    Model(#[from] ModelError),
}
