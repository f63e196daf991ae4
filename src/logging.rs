//! Log setup. The console front-end owns the terminal, so records are appended
//! to a file instead of stderr.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// Route `log` records to `path`, formatted `timestamp | LEVEL | message`.
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_file_logger(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create log directory")?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} | {} | {}",
                buf.timestamp(),
                record.level(),
                record.args()
            )
        })
        .try_init()
        .context("logger already initialized")
}

/// Logger for the one-shot subcommands, which leave stdout for their output.
pub fn init_stderr_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();
}
