// Library surface for the binary and for headless integration tests.
pub mod acuity;
pub mod app_dirs;
pub mod channel;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod kiosk;
pub mod runtime;
pub mod score;
pub mod session;
pub mod ui;

pub use error::{KioskError, Result};
