//! A headless driver for the `shade` core. It runs a cartridge for a fixed number of frames,
//! logs what the core reports, and can save the last frame as a PNG.

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use shade::{Fatal, Gameboy, PpuSignal};
use thiserror::Error;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod screenshot;

use config::Config;

#[derive(Debug, Parser)]
pub struct Args {
    /// Path to a TOML config file. Defaults to `wraith.toml` when present.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Path to the 256 byte boot image
    #[arg(long)]
    pub boot: Option<PathBuf>,
    /// Path to the cartridge image
    #[arg(long)]
    pub cart: Option<PathBuf>,
    /// Number of frames to run
    #[arg(long)]
    pub frames: Option<u64>,
    /// Write the last completed frame to this PNG
    #[arg(long)]
    pub screenshot: Option<PathBuf>,
    /// Log every executed instruction at `trace` level
    #[arg(long)]
    pub trace: bool,
    /// A `tracing` filter directive. Takes precedence over `RUST_LOG`.
    #[arg(long)]
    pub log: Option<String>,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("could not access {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("no {0} image was given")]
    MissingImage(&'static str),
    #[error("could not encode screenshot: {0}")]
    Png(#[from] png::EncodingError),
    #[error(transparent)]
    Core(#[from] Fatal),
}

fn main() -> ExitCode {
    let args = Args::parse();
    let mut config = match Config::read(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    config.apply(&args);
    init_logging(&config);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// `--log` (or the config's `log`) wins over `RUST_LOG`, which wins over `info`.
fn init_logging(config: &Config) {
    let filter = match &config.log {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn read_image(path: Option<&PathBuf>, name: &'static str) -> Result<Vec<u8>, RunError> {
    let path = path.ok_or(RunError::MissingImage(name))?;
    std::fs::read(path).map_err(|source| RunError::Io {
        path: path.clone(),
        source,
    })
}

fn run(config: &Config) -> Result<(), RunError> {
    let boot = read_image(config.boot.as_ref(), "boot")?;
    let cart = read_image(config.cartridge.as_ref(), "cartridge")?;
    let mut gb = Gameboy::with_config(&boot, cart, config.core)?;

    let result = drive(&mut gb, config.frames);
    if let Err(err) = &result {
        // The core already logged its dump, this is for whoever reads stdout.
        println!("{err}\n{}", gb.dump());
    } else {
        info!("\n{}", gb.dump());
    }
    result?;

    if let Some(path) = &config.screenshot {
        screenshot::write(path, gb.ppu.screen())?;
        info!("Saved frame {} to {path:?}", gb.ppu.frames());
    }
    Ok(())
}

/// Ticks the machine until `frames` frames have completed or the CPU stalls.
fn drive(gb: &mut Gameboy, frames: u64) -> Result<(), Fatal> {
    let mut done = 0;
    while done < frames {
        if gb.is_stalled() {
            info!("CPU is {} at 0x{:0>4X}, stopping", gb.cpu.state, gb.cpu.pc);
            break;
        }
        let tick = gb.tick()?;
        for event in tick.audio {
            debug!("{event}");
        }
        if tick.video.contains(&PpuSignal::VBlank) {
            done += 1;
            debug!("Frame {done} complete");
        }
    }
    Ok(())
}
