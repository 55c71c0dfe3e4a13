use std::{fs::OpenOptions, io::Write, path::Path};

use anyhow::Context as _;
use env_logger::Target;
use log::LevelFilter;

/// Logs to stderr at `level` unless `RUST_LOG` says otherwise.
pub fn init_stderr_logger(level: LevelFilter) {
    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Logs to the end of the file at `path`, for modes that own the terminal.
pub fn init_file_logger(level: LevelFilter, path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;
    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Writes `value` as one line of compact JSON and flushes.
pub fn write_json_line<W, T>(writer: &mut W, value: &T) -> anyhow::Result<()>
where
    W: Write,
    T: serde::Serialize,
{
    serde_json::to_writer(&mut *writer, value).context("Failed to write JSON response")?;
    writeln!(writer).context("Failed to write newline after JSON response")?;
    writer.flush().context("Failed to flush output")?;
    Ok(())
}
