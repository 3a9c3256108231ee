mod list_and_cleanup;

use super::{
    config::Config,
    threads::{start_cleanup_thread, CleanupThreadHandle},
};
use crate::{
    naming::compressed_name,
    util::{eprint_err, ErrorCode},
    RollError,
};
use chrono::{DateTime, Duration, Utc};
use std::{
    fs::{File, OpenOptions, Permissions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

pub(super) use list_and_cleanup::{list_backups, remove_or_compress_too_old_logfiles_impl};

// how often a colliding backup name is re-encoded with a later instant before we give up
const MAX_COLLISION_PROBES: u32 = 24;

#[derive(Debug)]
enum Inner {
    // no file is open; the next write opens or creates the active file
    Closed,
    // the active file, and its size as known to us
    Open { file: File, size: u64 },
}

#[derive(Debug)]
pub(super) struct State {
    config: Arc<Config>,
    inner: Inner,
    o_cleanup_thread_handle: Option<CleanupThreadHandle>,
}
impl State {
    pub(super) fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            inner: Inner::Closed,
            o_cleanup_thread_handle: None,
        }
    }

    pub(super) fn write_buffer(&mut self, buf: &[u8]) -> Result<usize, RollError> {
        let len = buf.len() as u64;
        if len > self.config.max_size {
            return Err(RollError::OversizedWrite {
                len: buf.len(),
                max: self.config.max_size,
            });
        }

        if let Inner::Closed = self.inner {
            self.open_existing_or_new()?;
        }
        if let Inner::Open { size, .. } = self.inner {
            if size + len > self.config.max_size {
                self.rotate()?;
            }
        }
        if let Inner::Open {
            ref mut file,
            ref mut size,
        } = self.inner
        {
            file.write_all(buf)?;
            *size += len;
        }
        Ok(buf.len())
    }

    // Moves the active file (if any) aside to a timestamped backup, starts a new empty
    // active file, and triggers a retention cycle.
    pub(super) fn rotate(&mut self) -> Result<(), RollError> {
        self.inner = Inner::Closed;
        let o_permissions = self.move_active_file_aside()?;
        let file = create_active_file(&self.config.path, o_permissions)?;
        self.inner = Inner::Open { file, size: 0 };
        self.trigger_cleanup();
        Ok(())
    }

    pub(super) fn flush(&mut self) -> std::io::Result<()> {
        if let Inner::Open { ref mut file, .. } = self.inner {
            file.flush()
        } else {
            Ok(())
        }
    }

    // Closes the active file and hands out the cleanup thread, which the caller must shut down
    // after releasing the lock on this state.
    pub(super) fn close(&mut self) -> (Result<(), RollError>, Option<CleanupThreadHandle>) {
        let result = match std::mem::replace(&mut self.inner, Inner::Closed) {
            Inner::Open { mut file, .. } => file.flush().map_err(RollError::from),
            Inner::Closed => Ok(()),
        };
        (result, self.o_cleanup_thread_handle.take())
    }

    fn open_existing_or_new(&mut self) -> Result<(), RollError> {
        let path = &self.config.path;
        match std::fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => return Err(RollError::OutputBadFile),
            Ok(metadata) => {
                let file = OpenOptions::new().append(true).open(path)?;
                self.inner = Inner::Open {
                    file,
                    size: metadata.len(),
                };
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let file = create_active_file(path, None)?;
                self.inner = Inner::Open { file, size: 0 };
            }
            Err(e) => return Err(e.into()),
        }
        // leftovers of earlier runs are handled as soon as we start writing
        self.trigger_cleanup();
        Ok(())
    }

    // Returns the permissions of the moved file, or None if there was no file to move.
    fn move_active_file_aside(&self) -> Result<Option<Permissions>, RollError> {
        let path = &self.config.path;
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if metadata.is_dir() {
            return Err(RollError::OutputBadFile);
        }

        std::fs::create_dir_all(&self.config.backup_dir)?;
        let backup_path = self.collision_free_backup_path(self.config.clock.now())?;
        match std::fs::rename(path, &backup_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::CrossesDevices => {
                copy_and_remove(path, &backup_path, metadata.permissions())?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(Some(metadata.permissions()))
    }

    // handles collisions with existing backups by moving the instant forward in growing steps;
    // a name is taken if the backup exists uncompressed or compressed
    fn collision_free_backup_path(&self, now: DateTime<Utc>) -> Result<PathBuf, RollError> {
        let mut timestamp = now;
        let mut step_millis = 1;
        for _ in 0..MAX_COLLISION_PROBES {
            let name = self.config.naming.encode(&timestamp)?;
            let candidate = self.config.backup_dir.join(&name);
            let compressed = self.config.backup_dir.join(compressed_name(&name));
            if !candidate.exists() && !compressed.exists() {
                return Ok(candidate);
            }
            timestamp += Duration::milliseconds(step_millis);
            step_millis *= 2;
        }
        Ok(self
            .config
            .backup_dir
            .join(self.config.naming.encode(&timestamp)?))
    }

    fn trigger_cleanup(&mut self) {
        if !self.config.retention.is_active() {
            return;
        }
        if !self.config.cleanup_in_background_thread {
            remove_or_compress_too_old_logfiles_impl(&self.config);
            return;
        }

        if self.o_cleanup_thread_handle.is_none() {
            match start_cleanup_thread(Arc::clone(&self.config)) {
                Ok(handle) => self.o_cleanup_thread_handle = Some(handle),
                Err(e) => {
                    eprint_err(
                        &self.config.error_channel,
                        ErrorCode::Spawn,
                        "cannot start the cleanup thread, cleaning up in the writing thread",
                        &e,
                    );
                    remove_or_compress_too_old_logfiles_impl(&self.config);
                    return;
                }
            }
        }
        if let Some(ref handle) = self.o_cleanup_thread_handle {
            handle.request_cleanup();
        }
    }
}

// Creates (or truncates) the active file; missing parent folders are created.
fn create_active_file(path: &Path, o_permissions: Option<Permissions>) -> Result<File, RollError> {
    let open = || {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
    };
    let file = match open() {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            open()?
        }
        Err(e) => return Err(e.into()),
    };
    if let Some(permissions) = o_permissions {
        file.set_permissions(permissions)?;
    }
    Ok(file)
}

// Fallback for moving a file across file systems.
fn copy_and_remove(from: &Path, to: &Path, permissions: Permissions) -> std::io::Result<()> {
    let mut source = File::open(from)?;
    let mut target = OpenOptions::new().write(true).create_new(true).open(to)?;
    std::io::copy(&mut source, &mut target)?;
    target.sync_all()?;
    target.set_permissions(permissions)?;
    drop(source);
    OpenOptions::new().write(true).truncate(true).open(from)?;
    std::fs::remove_file(from)
}
