use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    /// File could not be read.
    Io(String),
    /// TOML/JSON syntax or shape error.
    Parse(String),
    /// Well-formed but unusable (empty sheet name, bad column letters).
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::Validation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
