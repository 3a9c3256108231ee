use super::{config::Config, RollingFileWriter};
use crate::{
    naming::{validate_time_format, NamingScheme, DEFAULT_TIME_FORMAT},
    retention::RetentionPolicy,
    util::program_name,
    Clock, ErrorChannel, LoggerConfig, RollError, SystemClock, DEFAULT_MAX_SIZE_MB, MEGABYTE,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

/// Builder for [`RollingFileWriter`].
///
/// All settings are optional; the defaults give a writer that appends to
/// `<program name>-rollsink.log` in the system's temp folder, rotates it at 100 megabytes,
/// and keeps all backups forever, uncompressed.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug)]
pub struct RollingFileWriterBuilder {
    o_filename: Option<PathBuf>,
    max_size: u64,
    max_age_days: u64,
    max_backups: usize,
    local_time: bool,
    compress: bool,
    keep_last_decompressed: usize,
    time_format: String,
    o_backup_dir: Option<PathBuf>,
    clock: Arc<dyn Clock>,
    error_channel: ErrorChannel,
    cleanup_in_background_thread: bool,
}

/// Simple methods for influencing the behavior of the `RollingFileWriter`.
impl RollingFileWriterBuilder {
    pub(crate) fn new() -> Self {
        Self {
            o_filename: None,
            max_size: 0,
            max_age_days: 0,
            max_backups: 0,
            local_time: false,
            compress: false,
            keep_last_decompressed: 0,
            time_format: String::new(),
            o_backup_dir: None,
            clock: Arc::new(SystemClock),
            error_channel: ErrorChannel::default(),
            cleanup_in_background_thread: true,
        }
    }

    /// Specifies the path of the active log file.
    ///
    /// Missing parent folders are created when the file is first written to.
    #[must_use]
    pub fn filename<P: Into<PathBuf>>(mut self, filename: P) -> Self {
        self.o_filename = Some(filename.into());
        self
    }

    /// Rotate the active file before a write would make it exceed this number of megabytes.
    ///
    /// The default is 100.
    #[must_use]
    pub fn max_size(mut self, megabytes: u64) -> Self {
        self.max_size = megabytes.saturating_mul(MEGABYTE);
        self
    }

    /// Same as [`RollingFileWriterBuilder::max_size`], but with the limit given in bytes.
    #[must_use]
    pub fn max_size_bytes(mut self, bytes: u64) -> Self {
        self.max_size = bytes;
        self
    }

    /// Remove backups whose timestamp is older than this number of days.
    ///
    /// By default, backups never expire.
    #[must_use]
    pub fn max_age_days(mut self, days: u64) -> Self {
        self.max_age_days = days;
        self
    }

    /// Keep only this number of backups, the oldest ones are removed.
    ///
    /// A backup that exists both uncompressed and compressed counts once.
    /// By default, all backups are kept.
    #[must_use]
    pub fn max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups;
        self
    }

    /// Render the timestamps in backup names in local time, rather than in UTC.
    #[must_use]
    pub fn local_time(mut self, local_time: bool) -> Self {
        self.local_time = local_time;
        self
    }

    /// Compress backups with gzip.
    ///
    /// Compression happens during cleanup, which by default runs in a background thread.
    #[must_use]
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Leave this number of the newest backups uncompressed, also if compression is switched on.
    #[must_use]
    pub fn keep_last_decompressed(mut self, keep_last_decompressed: usize) -> Self {
        self.keep_last_decompressed = keep_last_decompressed;
        self
    }

    /// Specifies the chrono strftime format for the timestamps in backup names.
    ///
    /// The default is [`DEFAULT_TIME_FORMAT`]. The format must produce names that
    /// can be parsed back into a complete point in time, and must not produce path separators;
    /// [`RollingFileWriterBuilder::try_build`] rejects other formats.
    #[must_use]
    pub fn time_format<S: Into<String>>(mut self, format: S) -> Self {
        self.time_format = format.into();
        self
    }

    /// Specifies a separate folder for the backups.
    ///
    /// By default, backups are placed next to the active file.
    /// The folder is created when the first backup is moved there.
    #[must_use]
    pub fn backup_dir<P: Into<PathBuf>>(mut self, backup_dir: P) -> Self {
        self.o_backup_dir = Some(backup_dir.into());
        self
    }

    /// Replaces the system clock, e.g. for tests.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Specifies where failures of the background cleanup are reported.
    ///
    /// The default is [`ErrorChannel::StdErr`].
    #[must_use]
    pub fn error_channel(mut self, error_channel: ErrorChannel) -> Self {
        self.error_channel = error_channel;
        self
    }

    /// Defines if the cleanup activities (finding, deleting and compressing backups)
    /// are done in a background thread (default), or in the thread that causes the rotation.
    ///
    /// Cleaning up in the writing thread blocks the write that triggered the rotation,
    /// and must not be combined with [`ErrorChannel::Log`] if the log output of the program
    /// goes to this very writer.
    #[must_use]
    pub fn cleanup_in_background_thread(mut self, use_background_thread: bool) -> Self {
        self.cleanup_in_background_thread = use_background_thread;
        self
    }

    /// Produces the `RollingFileWriter`.
    ///
    /// No file is touched; the active file is opened or created with the first write.
    ///
    /// # Errors
    ///
    /// `RollError::OutputBadFile` if the path of the active file is an existing folder
    /// or has no file name.
    ///
    /// `RollError::TimeFormat` if the time format is not usable for backup names.
    pub fn try_build(self) -> Result<RollingFileWriter, RollError> {
        let path = self.o_filename.unwrap_or_else(|| {
            std::env::temp_dir().join(format!("{}-rollsink.log", program_name()))
        });
        if path.file_name().is_none() || path.is_dir() {
            return Err(RollError::OutputBadFile);
        }

        let time_format = if self.time_format.is_empty() {
            DEFAULT_TIME_FORMAT.to_string()
        } else {
            self.time_format
        };
        validate_time_format(&time_format)?;

        let backup_dir = self.o_backup_dir.unwrap_or_else(|| {
            path.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        });

        let max_size = if self.max_size == 0 {
            DEFAULT_MAX_SIZE_MB * MEGABYTE
        } else {
            self.max_size
        };

        Ok(RollingFileWriter::new(Config {
            naming: NamingScheme::for_active_file(&path, &time_format, self.local_time),
            path,
            backup_dir,
            max_size,
            retention: RetentionPolicy {
                max_age_days: self.max_age_days,
                max_backups: self.max_backups,
                compress: self.compress,
                keep_last_decompressed: self.keep_last_decompressed,
            },
            clock: self.clock,
            error_channel: self.error_channel,
            cleanup_in_background_thread: self.cleanup_in_background_thread,
        }))
    }
}

/// Alternative set of methods to control the behavior of the `RollingFileWriterBuilder`.
/// Use these methods when you want to control the settings flexibly,
/// e.g. with commandline arguments via `clap`.
impl RollingFileWriterBuilder {
    /// With None, the default file `<program name>-rollsink.log` in the temp folder is used.
    #[must_use]
    pub fn o_filename<P: Into<PathBuf>>(mut self, filename: Option<P>) -> Self {
        self.o_filename = filename.map(Into::into);
        self
    }

    /// With None, backups are placed next to the active file.
    #[must_use]
    pub fn o_backup_dir<P: Into<PathBuf>>(mut self, backup_dir: Option<P>) -> Self {
        self.o_backup_dir = backup_dir.map(Into::into);
        self
    }
}

impl From<&LoggerConfig> for RollingFileWriterBuilder {
    fn from(config: &LoggerConfig) -> Self {
        let non_empty = |p: &PathBuf| {
            if p.as_os_str().is_empty() {
                None
            } else {
                Some(p.clone())
            }
        };
        Self::new()
            .o_filename(non_empty(&config.filename))
            .max_size(config.max_size)
            .max_age_days(config.max_age)
            .max_backups(config.max_backups)
            .local_time(config.local_time)
            .compress(config.compress)
            .keep_last_decompressed(config.keep_last_decompressed)
            .time_format(config.time_format.clone())
            .o_backup_dir(non_empty(&config.backup_dir))
    }
}
