#![allow(dead_code)]

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use flate2::read::GzDecoder;
use rollsink::Clock;
use std::{
    io::Read,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

pub const TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

// A clock that only moves when it is told to.
#[derive(Debug)]
pub struct FakeClock(Mutex<DateTime<Utc>>);
impl FakeClock {
    pub fn new() -> Arc<Self> {
        Arc::new(FakeClock(Mutex::new(
            Utc.with_ymd_and_hms(2024, 6, 9, 12, 0, 0).unwrap(),
        )))
    }
    pub fn advance(&self, duration: Duration) {
        *self.0.lock().unwrap() += duration;
    }
}
impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

pub fn dir() -> temp_dir::TempDir {
    temp_dir::TempDir::new().unwrap()
}

// name of the backup of foo.log for the given instant, with UTC timestamps
pub fn backup_file(dir: &Path, ts: &DateTime<Utc>) -> PathBuf {
    dir.join(format!("foo-{}.log", ts.format(TIME_FORMAT)))
}

pub fn local_backup_file(dir: &Path, ts: &DateTime<Utc>) -> PathBuf {
    dir.join(format!(
        "foo-{}.log",
        ts.with_timezone(&Local).format(TIME_FORMAT)
    ))
}

pub fn gz_file(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".gz");
    PathBuf::from(s)
}

pub fn exists_with_content(path: &Path, content: &[u8]) {
    let found = std::fs::read(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    assert_eq!(
        found,
        content,
        "unexpected content in {}",
        path.display()
    );
}

pub fn exists_with_gz_content(path: &Path, content: &[u8]) {
    let mut found = Vec::new();
    GzDecoder::new(
        std::fs::File::open(path)
            .unwrap_or_else(|e| panic!("cannot open {}: {e}", path.display())),
    )
    .read_to_end(&mut found)
    .unwrap();
    assert_eq!(
        found,
        content,
        "unexpected content in {}",
        path.display()
    );
}

pub fn not_exist(path: &Path) {
    assert!(!path.exists(), "{} should not exist", path.display());
}

pub fn file_count(dir: &Path, expected: usize) {
    let found = std::fs::read_dir(dir).unwrap().count();
    assert_eq!(found, expected, "unexpected number of entries in {}", dir.display());
}
