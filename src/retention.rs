//! Decides which backup files are removed and which are compressed.
//!
//! The decision is pure: it works on a list of [`Backup`]s and does no I/O.
//! The writer executes the resulting [`RetentionPlan`] in the background after each rotation.

use crate::naming::COMPRESS_SUFFIX;
use chrono::{DateTime, Utc};
use std::{collections::HashMap, path::PathBuf};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// A backup file of the active log file, as found in the backup directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Backup {
    /// Full path of the file.
    pub path: PathBuf,
    /// Point in time encoded in the file name.
    pub timestamp: DateTime<Utc>,
    /// Whether the file name carries the compression suffix.
    pub compressed: bool,
}
impl Backup {
    // The path of the uncompressed variant, which identifies the logical backup.
    fn plain_path(&self) -> PathBuf {
        if self.compressed {
            let name = self.path.to_string_lossy();
            PathBuf::from(name.strip_suffix(COMPRESS_SUFFIX).unwrap_or(&name))
        } else {
            self.path.clone()
        }
    }
}

/// Limits for the backups of a log file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Backups older than this number of days are removed; 0 means no age limit.
    pub max_age_days: u64,
    /// Only this number of backups is kept, the older ones are removed; 0 means no limit.
    pub max_backups: usize,
    /// Whether backups are compressed.
    pub compress: bool,
    /// This number of newest backups is not compressed, even if `compress` is set.
    pub keep_last_decompressed: usize,
}
impl RetentionPolicy {
    /// Returns true if retention can have any effect at all.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.max_age_days > 0 || self.max_backups > 0 || self.compress
    }
}

/// The files to remove and the files to compress, as decided by [`plan`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RetentionPlan {
    /// Files to remove.
    pub remove: Vec<PathBuf>,
    /// Uncompressed files to compress; the original is removed once its compressed
    /// sibling is complete.
    pub compress: Vec<PathBuf>,
}
impl RetentionPlan {
    /// Returns true if there is nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.compress.is_empty()
    }
}

/// Returns true if the backup with the given name and position should be compressed.
///
/// `index_from_newest` is 0 for the newest backup. Files that carry the compression suffix
/// already are never compressed again.
#[must_use]
pub fn should_compress(
    keep_last_decompressed: usize,
    index_from_newest: usize,
    filename: &str,
) -> bool {
    if filename.ends_with(COMPRESS_SUFFIX) {
        false
    } else {
        index_from_newest >= keep_last_decompressed
    }
}

// One logical backup: the plain file, its compressed sibling, or both
// (the latter if a compression was in progress or got interrupted).
#[derive(Debug)]
struct BackupGroup {
    key: PathBuf,
    timestamp: DateTime<Utc>,
    o_plain: Option<PathBuf>,
    o_compressed: Option<PathBuf>,
}
impl BackupGroup {
    fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.o_plain.iter().chain(self.o_compressed.iter())
    }
}

/// Applies the policy to the given backups.
///
/// A backup that exists both compressed and uncompressed counts only once,
/// for `max_backups` as well as for `keep_last_decompressed`.
/// Backups that exceed `max_backups` or `max_age_days` are removed and never compressed.
#[must_use]
pub fn plan(backups: &[Backup], policy: &RetentionPolicy, now: DateTime<Utc>) -> RetentionPlan {
    let mut result = RetentionPlan::default();
    if !policy.is_active() {
        return result;
    }

    let groups = group_backups(backups);
    let o_cutoff = if policy.max_age_days > 0 {
        cutoff(now, policy.max_age_days)
    } else {
        None
    };

    for (index, group) in groups.iter().enumerate() {
        let too_many = policy.max_backups > 0 && index >= policy.max_backups;
        let too_old = o_cutoff.is_some_and(|cutoff| group.timestamp < cutoff);
        if too_many || too_old {
            result.remove.extend(group.files().cloned());
        } else if policy.compress {
            if let Some(ref plain) = group.o_plain {
                let filename = plain
                    .file_name()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
                if should_compress(policy.keep_last_decompressed, index, &filename) {
                    result.compress.push(plain.clone());
                }
            }
        }
    }
    result
}

// Groups the backups by their uncompressed name, newest first.
fn group_backups(backups: &[Backup]) -> Vec<BackupGroup> {
    let mut groups: Vec<BackupGroup> = Vec::with_capacity(backups.len());
    let mut index_by_key: HashMap<PathBuf, usize> = HashMap::with_capacity(backups.len());
    for backup in backups {
        let key = backup.plain_path();
        let idx = *index_by_key.entry(key.clone()).or_insert_with(|| {
            groups.push(BackupGroup {
                key,
                timestamp: backup.timestamp,
                o_plain: None,
                o_compressed: None,
            });
            groups.len() - 1
        });
        if backup.compressed {
            groups[idx].o_compressed = Some(backup.path.clone());
        } else {
            groups[idx].o_plain = Some(backup.path.clone());
        }
    }
    groups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.key.cmp(&a.key)));
    groups
}

fn cutoff(now: DateTime<Utc>, max_age_days: u64) -> Option<DateTime<Utc>> {
    let max_age = std::time::Duration::from_secs(max_age_days.saturating_mul(SECONDS_PER_DAY));
    chrono::Duration::from_std(max_age)
        .ok()
        .and_then(|max_age| now.checked_sub_signed(max_age))
}
