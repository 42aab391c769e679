//! The driver's settings. These are read from a TOML file and then overridden by whatever was
//! passed on the command line.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Args, RunError};

pub const DEFAULT_CONFIG_PATH: &str = "wraith.toml";

fn default_frames() -> u64 {
    60
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// The 256 byte boot image.
    #[serde(default)]
    pub boot: Option<PathBuf>,
    #[serde(default)]
    pub cartridge: Option<PathBuf>,
    /// How many frames to run before stopping.
    #[serde(default = "default_frames")]
    pub frames: u64,
    /// Where to write the last completed frame, if anywhere.
    #[serde(default)]
    pub screenshot: Option<PathBuf>,
    /// A `tracing` filter directive, e.g. `shade=debug`.
    #[serde(default)]
    pub log: Option<String>,
    #[serde(default)]
    pub core: shade::Config,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            boot: None,
            cartridge: None,
            frames: default_frames(),
            screenshot: None,
            log: None,
            core: shade::Config::default(),
        }
    }
}

impl Config {
    pub fn parse(s: &str) -> Result<Self, RunError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads the config file. A missing file falls back to the defaults unless it was asked for
    /// by name.
    pub fn read(path: Option<&Path>) -> Result<Self, RunError> {
        let (path, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_PATH), false),
        };
        match std::fs::read_to_string(path) {
            Ok(s) => Self::parse(&s),
            Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(source) => Err(RunError::Io {
                path: path.to_owned(),
                source,
            }),
        }
    }

    /// Lets the command line win over the file.
    pub fn apply(&mut self, args: &Args) {
        if let Some(boot) = &args.boot {
            self.boot = Some(boot.clone());
        }
        if let Some(cart) = &args.cart {
            self.cartridge = Some(cart.clone());
        }
        if let Some(frames) = args.frames {
            self.frames = frames;
        }
        if let Some(screenshot) = &args.screenshot {
            self.screenshot = Some(screenshot.clone());
        }
        if let Some(log) = &args.log {
            self.log = Some(log.clone());
        }
        if args.trace {
            self.core.trace_instructions = true;
        }
    }
}
