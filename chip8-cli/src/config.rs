//! Settings file.
//!
//! Settings are read from `chip8.yaml` in the working directory, or from the
//! file named by the `CHIP8_CONFIG` environment variable. Every field is
//! optional.
//!
//! ```yaml
//! vm:
//!   clock_frequency: 1000
//!   quirks:
//!     legacy_shift: true
//!   state_file: saves/game.bin
//! display:
//!   scale: 2
//!   buffering: single
//! ```
use std::{
    env, fs,
    io::ErrorKind as IoErrorKind,
    path::{Path, PathBuf},
};

use chip8::prelude::*;
use serde::Deserialize;

use crate::error::{AppError, ErrorKind};

pub const CONFIG_ENV: &str = "CHIP8_CONFIG";
pub const CONFIG_FILE_NAME: &str = "chip8.yaml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub vm: Chip8Conf,
    pub display: DisplaySettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Terminal characters per display cell, horizontally.
    pub scale: usize,
    pub buffering: BufferingMode,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            scale: 1,
            buffering: BufferingMode::default(),
        }
    }
}

impl Settings {
    /// Load the settings file, falling back to defaults when there is none.
    pub fn load() -> Result<Self, AppError> {
        let (path, explicit) = match env::var_os(CONFIG_ENV) {
            Some(path) => (PathBuf::from(path), true),
            None => (PathBuf::from(CONFIG_FILE_NAME), false),
        };

        match Self::from_file(&path) {
            Ok(settings) => {
                log::debug!("loaded settings from {}: {settings:#?}", path.display());
                Ok(settings)
            }
            // The default file is optional, an explicitly named one is not.
            Err(err) if !explicit && is_not_found(&err) => Ok(Self::default()),
            Err(err) => Err(err),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let file = fs::File::open(path)?;
        Ok(serde_yaml::from_reader(file)?)
    }

    pub fn parse(source: &str) -> Result<Self, AppError> {
        Ok(serde_yaml::from_str(source)?)
    }
}

fn is_not_found(err: &AppError) -> bool {
    match &err.kind {
        ErrorKind::Io(err) => err.kind() == IoErrorKind::NotFound,
        _ => false,
    }
}
