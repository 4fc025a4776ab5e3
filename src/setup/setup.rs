use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

use slog::Drain;
use slog::Level;
use slog::LevelFilter;
use slog::Logger;

use super::log_format::PkvFormat;

/// init_logger builds the root logger. Records go to `path` in append mode,
/// or to stderr if no path is given. Records below `level` are dropped.
pub fn init_logger(path: Option<&Path>, level: Level) -> io::Result<Logger> {
    let logger = match path {
        Some(p) => build_logger(open_log_file(p)?, level),
        None => build_logger(io::stderr(), level),
    };

    info!(logger, "logger ready"; "level" => level.as_str());
    Ok(logger)
}

/// parse_level accepts a level name such as "info" or its short form "INFO".
pub fn parse_level(s: &str) -> Option<Level> {
    s.parse::<Level>().ok()
}

fn build_logger<W>(w: W, level: Level) -> Logger
where
    W: io::Write + Send + 'static,
{
    let decorator = slog_term::PlainDecorator::new(w);
    let drain = PkvFormat::new(decorator).fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = LevelFilter::new(drain, level).fuse();

    Logger::root(drain, o!())
}

/// Opens log file with append mode. Creates a new log file if it doesn't exist.
fn open_log_file<P: AsRef<Path>>(path: P) -> io::Result<File> {
    let path = path.as_ref();
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::Other,
            "Unable to get parent directory of log file",
        )
    })?;
    if !parent.as_os_str().is_empty() && !parent.is_dir() {
        fs::create_dir_all(parent)?
    }
    OpenOptions::new().append(true).create(true).open(path)
}
