mod builder;
mod config;
mod state;
mod threads;

pub use self::builder::RollingFileWriterBuilder;

use self::{config::Config, state::State};
use crate::{retention::Backup, LoggerConfig, RollError};
use std::{
    io::Write,
    path::Path,
    sync::{Arc, Mutex},
};

/// A writer that appends to a log file and rotates it when it grows too large.
///
/// On rotation, the active file is renamed to a timestamped backup in the same (or the
/// configured backup) folder, and a new active file is started. Backups that exceed
/// the configured count or age are removed, and backups are optionally compressed;
/// by default this cleanup happens in a background thread.
///
/// `RollingFileWriter` can be shared between threads; all writes and rotations are serialized.
/// Besides [`RollingFileWriter::append`], it implements [`std::io::Write`],
/// also for `&RollingFileWriter`.
///
/// ```rust,no_run
/// use std::io::Write;
///
/// let mut writer = rollsink::RollingFileWriter::builder()
///     .filename("/var/log/myapp/myapp.log")
///     .max_size(500)
///     .max_backups(3)
///     .max_age_days(28)
///     .compress(true)
///     .try_build()?;
/// writeln!(writer, "Hello, world!")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[allow(clippy::module_name_repetitions)]
#[derive(Debug)]
pub struct RollingFileWriter {
    config: Arc<Config>,
    state: Mutex<State>,
}
impl RollingFileWriter {
    /// Instantiates a builder for `RollingFileWriter`.
    #[must_use]
    pub fn builder() -> RollingFileWriterBuilder {
        RollingFileWriterBuilder::new()
    }

    /// Produces a `RollingFileWriter` from decoded configuration settings.
    ///
    /// # Errors
    ///
    /// Same as for [`RollingFileWriterBuilder::try_build`].
    pub fn try_from_config(config: &LoggerConfig) -> Result<Self, RollError> {
        RollingFileWriterBuilder::from(config).try_build()
    }

    fn new(config: Config) -> Self {
        let config = Arc::new(config);
        Self {
            state: Mutex::new(State::new(Arc::clone(&config))),
            config,
        }
    }

    /// Path of the active log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Writes the complete buffer to the active file.
    ///
    /// The first write after construction or after [`RollingFileWriter::close`]
    /// opens the active file for appending, or creates it, together with missing parent folders.
    /// If the buffer does not fit into the active file anymore, the file is rotated first.
    /// A write is never split between two files.
    ///
    /// # Errors
    ///
    /// `RollError::OversizedWrite` if the buffer is larger than the maximum file size;
    /// then nothing is written.
    ///
    /// `RollError::OutputBadFile` if the path of the active file is a folder.
    ///
    /// `RollError::Io` if opening, rotating or writing fails.
    ///
    /// `RollError::Poison` if a thread panicked while holding the lock of this writer.
    pub fn append(&self, buf: &[u8]) -> Result<usize, RollError> {
        self.state
            .lock()
            .map_err(|_| RollError::Poison)?
            .write_buffer(buf)
    }

    /// Rotates the active file immediately, as if it had reached its maximum size.
    ///
    /// If no active file exists yet, only a new empty active file is created.
    ///
    /// # Errors
    ///
    /// `RollError::Io` if renaming or creating a file fails.
    ///
    /// `RollError::Poison` if a thread panicked while holding the lock of this writer.
    pub fn rotate(&self) -> Result<(), RollError> {
        self.state.lock().map_err(|_| RollError::Poison)?.rotate()
    }

    /// Closes the active file, and waits until all requested cleanup work is done.
    ///
    /// The writer remains usable: a later write reopens the active file.
    ///
    /// # Errors
    ///
    /// `RollError::Io` if flushing the active file fails.
    ///
    /// `RollError::Poison` if a thread panicked while holding the lock of this writer.
    pub fn close(&self) -> Result<(), RollError> {
        let (result, o_cleanup_thread_handle) =
            self.state.lock().map_err(|_| RollError::Poison)?.close();
        if let Some(cleanup_thread_handle) = o_cleanup_thread_handle {
            cleanup_thread_handle.shutdown();
        }
        result
    }

    /// Lists the backups of the active file, newest first.
    ///
    /// # Errors
    ///
    /// `RollError::Io` if the backup folder exists but cannot be read.
    pub fn backups(&self) -> Result<Vec<Backup>, RollError> {
        Ok(state::list_backups(&self.config)?)
    }
}

impl Write for &RollingFileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(self.append(buf)?)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.state
            .lock()
            .map_err(|_| std::io::Error::from(RollError::Poison))?
            .flush()
    }
}

impl Write for RollingFileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        (&*self).write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        (&*self).flush()
    }
}

impl Drop for RollingFileWriter {
    fn drop(&mut self) {
        self.close().ok();
    }
}

#[cfg(test)]
mod test {
    use super::RollingFileWriter;
    use crate::RollError;
    use std::io::Write;

    #[test]
    fn test_io_write() {
        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.path().join("foo.log");
        let mut writer = RollingFileWriter::builder()
            .filename(&path)
            .max_size_bytes(10)
            .try_build()
            .unwrap();

        writer.write_all(b"boo!").unwrap();
        (&writer).write_all(b"boo!").unwrap();
        writer.flush().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"boo!boo!");

        let e = writer.write(b"this is far too much").unwrap_err();
        assert_eq!(e.kind(), std::io::ErrorKind::InvalidInput);
        assert_eq!(e.to_string(), "write length 20 exceeds maximum file size 10");
    }

    #[test]
    fn test_write_after_close() {
        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.path().join("foo.log");
        let writer = RollingFileWriter::builder()
            .filename(&path)
            .try_build()
            .unwrap();

        writer.append(b"foo").unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
        writer.append(b"bar").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"foobar");
    }

    #[test]
    fn test_directory_in_place_of_file() {
        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.path().join("foo.log");
        let writer = RollingFileWriter::builder()
            .filename(&path)
            .try_build()
            .unwrap();
        std::fs::create_dir(&path).unwrap();
        assert!(matches!(
            writer.append(b"foo"),
            Err(RollError::OutputBadFile)
        ));
    }
}
