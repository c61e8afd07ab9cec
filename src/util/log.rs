use color_eyre::eyre::{Result, eyre};
use directories::ProjectDirs;
use std::{path::PathBuf, sync::Mutex};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "SHIURBANK_PLAYER_LOG";
pub const LOG_FILE: &str = "shiurbank-player.log";

pub fn data_dir() -> Result<PathBuf> {
    ProjectDirs::from("org", "ShiurBank", "shiurbank-player")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .ok_or_else(|| eyre!("No home directory to keep logs in"))
}

/// Logs go to a file: the terminal belongs to the player UI.
pub fn initialize_logging() -> Result<()> {
    let directory = data_dir()?;
    std::fs::create_dir_all(&directory)?;
    let log_file = std::fs::File::create(directory.join(LOG_FILE))?;

    let filter = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")));

    let file_layer = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(Mutex::new(log_file))
        .with_target(false)
        .with_ansi(false)
        .with_filter(EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(())
}
