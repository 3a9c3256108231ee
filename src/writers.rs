//! Contains the [`RollingFileWriter`] and its builder.
//!
//! The writer owns one active log file. All writes go to that file; when a write would make
//! it exceed the maximum size, the file is rotated:
//!
//! * it is renamed to a backup whose name carries the time of the rotation,
//!   see [`naming`](crate::naming),
//! * a new active file is created, with the permissions of the old one,
//! * and a cleanup is requested, which removes and compresses backups according to
//!   the [`RetentionPolicy`](crate::RetentionPolicy).
//!
//! The cleanup runs by default in a background thread that is started with the first
//! request. Requests that come in while a cleanup is running are served by a single
//! following cleanup. [`RollingFileWriter::close`] waits until all requested cleanups are done.

mod rolling_file_writer;

pub use self::rolling_file_writer::{RollingFileWriter, RollingFileWriterBuilder};
