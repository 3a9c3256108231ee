// only enables the `doc_cfg` feature when the `docsrs` configuration attribute is defined
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::unused_self)]
//! A writer for log files that rotates the file when it reaches a size limit,
//! and keeps the number, the age and the compression of the old files under control.
//!
//! [`RollingFileWriter`] implements [`std::io::Write`], so it can be plugged into any logging
//! framework that writes formatted lines to an `io::Write`:
//!
//! ```rust,no_run
//! use std::io::Write;
//!
//! let mut writer = rollsink::RollingFileWriter::builder()
//!     .filename("/var/log/myapp/foo.log")
//!     .max_size(500) // megabytes
//!     .max_backups(3)
//!     .max_age_days(28)
//!     .compress(true)
//!     .try_build()?;
//! writeln!(writer, "something happened")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! When a write would make the active file `foo.log` exceed its maximum size, the file is
//! renamed to a backup with the current time in its name, e.g. `foo-2024-06-09T10-22-03.123.log`,
//! and a new `foo.log` is started. Afterwards, and whenever the active file is opened,
//! a cleanup removes backups that exceed [`RollingFileWriterBuilder::max_backups`] or
//! [`RollingFileWriterBuilder::max_age_days`], and compresses the others with gzip if
//! [`RollingFileWriterBuilder::compress`] is set.
//!
//! See
//!
//! * the builder [`RollingFileWriterBuilder`] for all configuration options,
//! * [`LoggerConfig`] for reading the configuration from JSON, TOML or YAML,
//! * module [`naming`] for the format of the backup names,
//! * and module [`retention`] for the rules that decide which backups are kept.
//!
//! Failures of the cleanup cannot be returned to any caller; they are reported on the
//! configurable [`ErrorChannel`].

mod clock;
mod config;
mod roll_error;
mod util;

pub mod naming;
pub mod retention;
pub mod writers;

pub use crate::clock::{Clock, SystemClock};
pub use crate::config::LoggerConfig;
pub use crate::retention::{Backup, RetentionPlan, RetentionPolicy};
pub use crate::roll_error::RollError;
pub use crate::util::ErrorChannel;
pub use crate::writers::{RollingFileWriter, RollingFileWriterBuilder};

/// Number of bytes in a megabyte, as used for the maximum file size.
pub const MEGABYTE: u64 = 1024 * 1024;

/// Default maximum size of the active file, in megabytes.
pub const DEFAULT_MAX_SIZE_MB: u64 = 100;
