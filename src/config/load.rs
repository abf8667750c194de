use std::fs;
use std::path::Path;

use crate::config::types::PowerAnalysisConfig;
use crate::error::PowerSimErr;

impl PowerAnalysisConfig {
    /// Parses a TOML document. Missing sections and fields take their defaults;
    /// no validation is performed here.
    pub fn from_toml_str(contents: &str) -> Result<Self, PowerSimErr> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PowerSimErr> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, PowerSimErr> {
        Ok(toml::to_string_pretty(self)?)
    }
}
