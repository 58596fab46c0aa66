// Configuration loading

pub mod error;
pub mod profile;
pub mod settings;

pub use error::ConfigError;
pub use profile::{CompareProfile, OutputConfig, SideConfig};
pub use settings::{OutputKind, Settings};
