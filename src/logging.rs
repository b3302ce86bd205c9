//! Diagnostic logging setup
//!
//! The dashboard owns the terminal, so while it runs logs either go to a
//! file or nowhere. Console modes log to stderr. `RUST_LOG` overrides the
//! level picked from `--verbose`.

use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Where log lines end up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogSink<'a> {
    File(&'a Path),
    Stderr,
    Off,
}

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "beaches_twin=debug" } else { "warn" }))
}

/// Install the global subscriber. Call once, before generating anything.
pub fn init(sink: LogSink<'_>, verbose: bool) -> Result<(), Box<dyn Error + Send + Sync>> {
    match sink {
        LogSink::File(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter(verbose))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()?;
        }
        LogSink::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter(verbose))
                .with_writer(std::io::stderr)
                .try_init()?;
        }
        LogSink::Off => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_sink_receives_events() {
        let path = std::env::temp_dir().join(format!("beaches_twin_log_{}.log", std::process::id()));
        init(LogSink::File(&path), false).unwrap();

        tracing::warn!("file sink event");
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(contents.contains("file sink event"));
        // A second subscriber cannot be installed.
        assert!(init(LogSink::Stderr, false).is_err());
        assert!(init(LogSink::Off, false).is_ok());
    }
}
