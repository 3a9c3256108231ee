use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

/// Describes where diagnostics about failing background work are written to.
///
/// Deleting and compressing backup files happens asynchronously, so failures there cannot be
/// returned to the caller of `write` or `rotate`. They are reported on this channel instead,
/// and the remaining work of the cleanup cycle goes on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ErrorChannel {
    /// Write diagnostics to stderr (default).
    #[default]
    StdErr,
    /// Write diagnostics to stdout.
    StdOut,
    /// Append diagnostics to the specified file; missing parent folders are created.
    File(PathBuf),
    /// Forward diagnostics to the `log` facade, at level `warn` with target `rollsink`.
    Log,
    /// Don't write diagnostics at all.
    DevNull,
}

// Identifies the kind of background work that failed.
#[derive(Copy, Clone, Debug)]
pub(crate) enum ErrorCode {
    Scan,
    Cleanup,
    Compress,
    Spawn,
}

pub(crate) const LOG_TARGET: &str = "rollsink";

pub(crate) fn eprint_err(
    channel: &ErrorChannel,
    error_code: ErrorCode,
    msg: &str,
    err: &dyn std::error::Error,
) {
    let line = format!("[rollsink][ERRCODE::{error_code:?}] {msg}, caused by {err}");
    match channel {
        ErrorChannel::StdErr => {
            eprintln!("{line}");
        }
        ErrorChannel::StdOut => {
            println!("{line}");
        }
        ErrorChannel::File(path) => {
            if let Err(e) = write_to_file(path, &line) {
                eprintln!("{line}");
                eprintln!("[rollsink] writing to the error channel file failed with {e}");
            }
        }
        ErrorChannel::Log => {
            log::warn!(target: LOG_TARGET, "{line}");
        }
        ErrorChannel::DevNull => {}
    }
}

fn write_to_file(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}

// The name of the running program, as used for the default log file.
pub(crate) fn program_name() -> String {
    let arg0 = std::env::args().next().unwrap_or_else(|| "rs".to_owned());
    Path::new(&arg0)
        .file_stem()
        .map_or_else(|| "rs".to_owned(), |s| s.to_string_lossy().to_string())
}
