//! Tracing setup for the binary.
//!
//! The terminal is owned by the alert, so logs go to a file.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber. Without a usable log file, logging stays off.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let Some(path) = config.file_path() else {
        return Ok(());
    };
    let file = match open_log_file(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Logging disabled: cannot open {}: {}", path.display(), err);
            return Ok(());
        }
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unwritable_log_path_leaves_logging_off() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let config = LoggingConfig {
            file: Some(blocker.join("logs").join("alert.log")),
            ..Default::default()
        };

        assert!(open_log_file(config.file.as_deref().unwrap()).is_err());
        assert!(init(&config).is_ok());
    }
}
