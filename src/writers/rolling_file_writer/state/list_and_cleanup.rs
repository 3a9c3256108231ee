use super::super::config::Config;
use crate::{
    naming::compressed_name,
    retention::{self, Backup, RetentionPlan},
    util::{eprint_err, ErrorCode},
};
use flate2::{write::GzEncoder, Compression};
use std::{
    fs::{File, OpenOptions},
    io::ErrorKind,
    path::{Path, PathBuf},
};

// Lists all files in the backup folder whose names decode as (plain or compressed) backups
// of the active file, newest first.
//
// Folders and files with names that only resemble backups are ignored.
pub(crate) fn list_backups(config: &Config) -> Result<Vec<Backup>, std::io::Error> {
    let read_dir = match std::fs::read_dir(&config.backup_dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut backups = read_dir
        .flatten(/*ignore errors from reading entries in the directory*/)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let filename = path.file_name()?.to_str()?.to_string();
            if let Some(timestamp) = config.naming.decode(&filename) {
                Some(Backup {
                    path,
                    timestamp,
                    compressed: false,
                })
            } else {
                config
                    .naming
                    .decode_compressed(&filename)
                    .map(|timestamp| Backup {
                        path,
                        timestamp,
                        compressed: true,
                    })
            }
        })
        .collect::<Vec<Backup>>();
    backups.sort_unstable_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.path.cmp(&a.path))
    });
    Ok(backups)
}

// One retention cycle: re-scan the backup folder, then remove and compress files as the
// retention policy demands.
//
// Failures are reported on the error channel; they never stop the rest of the cycle.
// Returns the files that were successfully removed or compressed.
pub(crate) fn remove_or_compress_too_old_logfiles_impl(config: &Config) -> RetentionPlan {
    let mut done = RetentionPlan::default();
    if !config.retention.is_active() {
        return done;
    }

    let backups = match list_backups(config) {
        Ok(backups) => backups,
        Err(e) => {
            eprint_err(
                &config.error_channel,
                ErrorCode::Scan,
                &format!("cannot list backups in {}", config.backup_dir.display()),
                &e,
            );
            return done;
        }
    };

    let plan = retention::plan(&backups, &config.retention, config.clock.now());

    for file in &plan.remove {
        match std::fs::remove_file(file) {
            Ok(()) => done.remove.push(file.clone()),
            // another cleanup cycle was faster
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                eprint_err(
                    &config.error_channel,
                    ErrorCode::Cleanup,
                    &format!("cannot remove backup {}", file.display()),
                    &e,
                );
            }
        }
    }

    for file in &plan.compress {
        match compress_file(file) {
            Ok(()) => done.compress.push(file.clone()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                eprint_err(
                    &config.error_channel,
                    ErrorCode::Compress,
                    &format!("cannot compress backup {}", file.display()),
                    &e,
                );
            }
        }
    }
    done
}

// Writes the gzip-compressed content of `file` to its sibling with the compression suffix,
// and removes `file` only after the compressed file is complete and synced.
//
// An existing sibling, e.g. from an interrupted earlier run, is replaced.
// If compression fails, the partial sibling is removed and `file` is left untouched.
fn compress_file(file: &Path) -> Result<(), std::io::Error> {
    let compressed = compressed_path(file);
    let mut source = File::open(file)?;
    let permissions = source.metadata()?.permissions();

    let result = (|| {
        let target = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&compressed)?;
        let mut gz_encoder = GzEncoder::new(target, Compression::default());
        std::io::copy(&mut source, &mut gz_encoder)?;
        let target = gz_encoder.finish()?;
        target.sync_all()?;
        std::fs::set_permissions(&compressed, permissions)
    })();

    match result {
        Ok(()) => {
            drop(source);
            std::fs::remove_file(file)
        }
        Err(e) => {
            std::fs::remove_file(&compressed).ok();
            Err(e)
        }
    }
}

fn compressed_path(file: &Path) -> PathBuf {
    let filename = file
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    file.with_file_name(compressed_name(&filename))
}
