pub mod caption;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod fs_utils;
pub mod models;
pub mod runner;

pub use constants::{CONFIG_FILE_NAME, DEFAULT_SERVER_URL, SUPPORTED_EXTENSIONS};
pub use controller::RunController;
pub use error::RunError;
pub use models::{CaptionSettings, CaptionerConfig, RunEvent, RunOutcome, Theme};
pub use runner::CaptionRun;
