use thiserror::Error;

/// Describes errors in the initialization and the synchronous operation of a
/// [`RollingFileWriter`](crate::RollingFileWriter).
///
/// Failures of the background cleanup (deleting or compressing backups) are not
/// reported with this type; they are written to the configured
/// [`ErrorChannel`](crate::ErrorChannel) instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RollError {
    /// A single write was larger than the configured maximum file size.
    ///
    /// Nothing was written, and the state of the writer is unchanged.
    #[error("write length {len} exceeds maximum file size {max}")]
    OversizedWrite {
        /// Length of the rejected write, in bytes.
        len: usize,
        /// Configured maximum file size, in bytes.
        max: u64,
    },

    /// The configured log file path denotes an existing directory.
    #[error("Log file cannot be written because the specified path is a directory")]
    OutputBadFile,

    /// The configured time format cannot be used for backup file names.
    #[error("Invalid time format for backup file names: {0:?}")]
    TimeFormat(String),

    /// Some synchronization object is poisoned.
    #[error("Some synchronization object is poisoned")]
    Poison,

    /// Opening, creating, renaming or writing a file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The JSON configuration could not be decoded.
    #[cfg_attr(docsrs, doc(cfg(feature = "json")))]
    #[cfg(feature = "json")]
    #[error("Configuration cannot be decoded from JSON")]
    Json(#[from] serde_json::Error),

    /// The TOML configuration could not be decoded.
    #[cfg_attr(docsrs, doc(cfg(feature = "toml")))]
    #[cfg(feature = "toml")]
    #[error("Configuration cannot be decoded from TOML")]
    Toml(#[from] toml::de::Error),

    /// The YAML configuration could not be decoded.
    #[cfg_attr(docsrs, doc(cfg(feature = "yaml")))]
    #[cfg(feature = "yaml")]
    #[error("Configuration cannot be decoded from YAML")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<RollError> for std::io::Error {
    fn from(e: RollError) -> Self {
        match e {
            RollError::Io(e) => e,
            e @ (RollError::OversizedWrite { .. } | RollError::TimeFormat(_)) => {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
            }
            e => std::io::Error::other(e),
        }
    }
}
