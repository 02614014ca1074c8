use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KioskError {
    /// The serial port could not be opened at startup. Never retried.
    #[error("could not open port {port}: {source}")]
    PortOpen {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// The transport failed after a successful open
    #[error("serial transport error: {0}")]
    Transport(#[from] io::Error),

    #[error("render surface error: {0}")]
    Surface(#[source] io::Error),

    #[error("could not write config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl KioskError {
    pub fn surface(err: io::Error) -> Self {
        Self::Surface(err)
    }
}

pub type Result<T> = std::result::Result<T, KioskError>;
