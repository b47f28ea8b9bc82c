//! Log stream setup.
//!
//! Every pipeline stage reports through the `log` facade. [`init`] installs an
//! `env_logger` backend that writes one line per event:
//!
//! ```text
//! [2025-03-14 15:09:27] Retrieved 42 timestamps
//! ```
//!
//! The default filter is `info`; `RUST_LOG` overrides it.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Local, TimeZone};
use env_logger::{Builder, Env, Target};

/// Timestamp layout of the log stream.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render one log line (without the trailing newline).
pub fn format_line<Tz>(at: &DateTime<Tz>, message: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("[{}] {message}", at.format(TIMESTAMP_FORMAT))
}

/// Install the global logger. With `log_file`, lines are appended to that
/// file; otherwise they go to stderr.
///
/// Fails if the file cannot be opened or a logger is already installed.
pub fn init(log_file: Option<&Path>) -> io::Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format(|buf, record| {
        writeln!(buf, "{}", format_line(&Local::now(), &record.args().to_string()))
    });

    if let Some(path) = log_file {
        builder.target(Target::Pipe(Box::new(open_append(path)?)));
    }

    builder
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))
}

/// Open `path` for appending, creating it group-writable if missing.
pub fn open_append(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o664);
    }
    options.open(path)
}
