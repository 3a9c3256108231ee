use crate::{naming::NamingScheme, retention::RetentionPolicy, Clock, ErrorChannel};
use std::{path::PathBuf, sync::Arc};

// The immutable configuration of a RollingFileWriter.
//
// It is shared between the writer and its background cleanup thread.
#[derive(Debug)]
pub(crate) struct Config {
    // the active file
    pub(crate) path: PathBuf,
    // where backups are moved to and searched in
    pub(crate) backup_dir: PathBuf,
    // rotation threshold, in bytes
    pub(crate) max_size: u64,
    pub(crate) naming: NamingScheme,
    pub(crate) retention: RetentionPolicy,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) error_channel: ErrorChannel,
    pub(crate) cleanup_in_background_thread: bool,
}
