//! Encoding timestamps into backup file names, and decoding them back.
//!
//! A backup of the active file `<dir>/<base><ext>` is named `<base>-<timestamp><ext>`,
//! e.g. `foo-2014-05-04T14-44-33.555.log` for the active file `foo.log`;
//! a compressed backup additionally carries the suffix [`COMPRESS_SUFFIX`].
//!
//! The timestamp is rendered and parsed with the same
//! [chrono strftime format](https://docs.rs/chrono/latest/chrono/format/strftime/index.html).

use crate::RollError;
use chrono::{
    format::{Item, StrftimeItems},
    DateTime, Duration, Local, LocalResult, NaiveDateTime, TimeZone, Utc,
};
use std::{fmt::Write, path::Path};

/// Default format of the timestamp in backup file names.
///
/// Has constant length, millisecond precision, and contains no colons,
/// e.g. `2014-05-04T14-44-33.555`.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

/// Suffix that is appended to the name of a backup file when it is compressed.
pub const COMPRESS_SUFFIX: &str = ".gz";

/// Renders `<basename>-<timestamp><ext>`.
///
/// The timestamp is rendered in UTC, unless `use_local` is true.
/// `ext` is expected to include its leading dot, or to be empty.
///
/// # Errors
///
/// `RollError::TimeFormat` if `format` contains a specifier that chrono cannot render.
pub fn backup_name(
    ts: &DateTime<Utc>,
    basename: &str,
    ext: &str,
    format: &str,
    use_local: bool,
) -> Result<String, RollError> {
    let mut name = String::with_capacity(basename.len() + format.len() + ext.len() + 8);
    name.push_str(basename);
    name.push('-');
    let rendered = if use_local {
        write!(name, "{}", ts.with_timezone(&Local).format(format))
    } else {
        write!(name, "{}", ts.format(format))
    };
    rendered.map_err(|_| RollError::TimeFormat(format.to_string()))?;
    name.push_str(ext);
    Ok(name)
}

/// Parses the timestamp out of a backup file name.
///
/// Returns `None` if the name does not start with `<basename>-`, does not end with `ext`,
/// or if the part in between does not parse completely with `format`.
/// Names with trailing bytes, like the compressed variant of a backup, are rejected.
///
/// If `format` contains a UTC offset (`%z`), the offset is honored. Otherwise, with
/// `use_local`, the timestamp is interpreted in the local time zone; a wall-clock time
/// that occurs twice, in the hour repeated when daylight saving time ends, resolves to
/// its first occurrence.
#[must_use]
pub fn timestamp_from_name(
    filename: &str,
    basename: &str,
    ext: &str,
    format: &str,
    use_local: bool,
) -> Option<DateTime<Utc>> {
    let middle = filename
        .strip_prefix(basename)?
        .strip_prefix('-')?
        .strip_suffix(ext)?;
    if let Ok(ts) = DateTime::parse_from_str(middle, format) {
        return Some(ts.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(middle, format).ok()?;
    if use_local {
        match Local.from_local_datetime(&naive) {
            LocalResult::Single(ts) | LocalResult::Ambiguous(ts, _) => {
                Some(ts.with_timezone(&Utc))
            }
            LocalResult::None => None,
        }
    } else {
        Some(Utc.from_utc_datetime(&naive))
    }
}

/// Naming rules for the backups of one active file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamingScheme {
    basename: String,
    ext: String,
    format: String,
    use_local: bool,
}
impl NamingScheme {
    /// Derives basename and extension from the file name of the active file.
    ///
    /// The extension is everything from the last dot on, so `foo.log` results in
    /// basename `foo` and extension `.log`, and `foo` in basename `foo` and no extension.
    #[must_use]
    pub fn for_active_file(active: &Path, format: &str, use_local: bool) -> Self {
        let filename = active
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let (basename, ext) = match filename.rfind('.') {
            Some(idx) => (filename[..idx].to_string(), filename[idx..].to_string()),
            None => (filename, String::new()),
        };
        Self {
            basename,
            ext,
            format: format.to_string(),
            use_local,
        }
    }

    /// The basename of the active file, which all backups start with.
    #[must_use]
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// The extension of the active file, including the leading dot.
    #[must_use]
    pub fn ext(&self) -> &str {
        &self.ext
    }

    /// Renders the file name of a backup for the given point in time.
    ///
    /// # Errors
    ///
    /// `RollError::TimeFormat` if the format of this scheme cannot be rendered.
    pub fn encode(&self, ts: &DateTime<Utc>) -> Result<String, RollError> {
        backup_name(ts, &self.basename, &self.ext, &self.format, self.use_local)
    }

    /// Parses the timestamp of an uncompressed backup file name.
    #[must_use]
    pub fn decode(&self, filename: &str) -> Option<DateTime<Utc>> {
        timestamp_from_name(
            filename,
            &self.basename,
            &self.ext,
            &self.format,
            self.use_local,
        )
    }

    /// Parses the timestamp of a compressed backup file name.
    #[must_use]
    pub fn decode_compressed(&self, filename: &str) -> Option<DateTime<Utc>> {
        self.decode(filename.strip_suffix(COMPRESS_SUFFIX)?)
    }
}

/// The name of the compressed variant of a backup file.
#[must_use]
pub fn compressed_name(filename: &str) -> String {
    [filename, COMPRESS_SUFFIX].concat()
}

// Rejects formats that chrono cannot render, that cannot be parsed back into a full
// date-time, or that would produce path separators.
pub(crate) fn validate_time_format(format: &str) -> Result<(), RollError> {
    let err = || RollError::TimeFormat(format.to_string());
    if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(err());
    }
    let sample = Utc
        .with_ymd_and_hms(2014, 5, 4, 14, 44, 33)
        .single()
        .ok_or_else(err)?
        + Duration::milliseconds(555);
    let mut rendered = String::new();
    write!(rendered, "{}", sample.format(format)).map_err(|_| err())?;
    if rendered.contains(['/', '\\']) {
        return Err(err());
    }
    NaiveDateTime::parse_from_str(&rendered, format).map_err(|_| err())?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{
        backup_name, compressed_name, timestamp_from_name, validate_time_format, NamingScheme,
        DEFAULT_TIME_FORMAT,
    };
    use crate::RollError;
    use chrono::{Duration, SubsecRound, TimeZone, Utc};
    use std::path::Path;

    #[test]
    fn test_timestamp_from_name() {
        let scheme = NamingScheme::for_active_file(
            Path::new("/var/log/myfoo/foo.log"),
            DEFAULT_TIME_FORMAT,
            false,
        );

        let expected = Utc.with_ymd_and_hms(2014, 5, 4, 14, 44, 33).unwrap()
            + Duration::milliseconds(555);
        assert_eq!(
            scheme.decode("foo-2014-05-04T14-44-33.555.log"),
            Some(expected)
        );
        // no extension
        assert_eq!(scheme.decode("foo-2014-05-04T14-44-33.555"), None);
        // no prefix
        assert_eq!(scheme.decode("2014-05-04T14-44-33.555.log"), None);
        // the active file itself
        assert_eq!(scheme.decode("foo.log"), None);
        // compressed variant is not masked into a match
        assert_eq!(scheme.decode("foo-2014-05-04T14-44-33.555.log.gz"), None);
        assert_eq!(
            scheme.decode_compressed("foo-2014-05-04T14-44-33.555.log.gz"),
            Some(expected)
        );
        // other log with the same prefix
        assert_eq!(scheme.decode("foo-bar.log"), None);
        // trailing garbage in the timestamp
        assert_eq!(scheme.decode("foo-2014-05-04T14-44-33.555x.log"), None);
    }

    #[test]
    fn test_backup_name() {
        let ts = Utc.with_ymd_and_hms(2014, 5, 4, 14, 44, 33).unwrap()
            + Duration::milliseconds(5);
        assert_eq!(
            backup_name(&ts, "foo", ".log", DEFAULT_TIME_FORMAT, false).unwrap(),
            "foo-2014-05-04T14-44-33.005.log"
        );
        assert_eq!(
            backup_name(&ts, "foo", "", "%Y%m%d%H%M%S%3f", false).unwrap(),
            "foo-20140504144433005"
        );
        assert!(matches!(
            backup_name(&ts, "foo", ".log", "%Y-%Q", false),
            Err(RollError::TimeFormat(_))
        ));
        assert_eq!(
            compressed_name("foo-20140504144433005"),
            "foo-20140504144433005.gz"
        );
    }

    #[test]
    fn test_split_of_active_file() {
        let scheme = NamingScheme::for_active_file(
            Path::new("dir/my.app.log"),
            DEFAULT_TIME_FORMAT,
            false,
        );
        assert_eq!(scheme.basename(), "my.app");
        assert_eq!(scheme.ext(), ".log");

        let scheme =
            NamingScheme::for_active_file(Path::new("dir/app"), DEFAULT_TIME_FORMAT, false);
        assert_eq!(scheme.basename(), "app");
        assert_eq!(scheme.ext(), "");
    }

    #[test]
    fn test_round_trip() {
        let formats: [(&str, u16); 4] = [
            (DEFAULT_TIME_FORMAT, 3),
            ("%Y%m%d%H%M%S%3f", 3),
            ("%Y.%m.%d.%H.%M.%S%.3f", 3),
            ("%Y-%m-%d_%H-%M-%S", 0),
        ];
        let start = Utc.with_ymd_and_hms(2023, 1, 17, 3, 25, 41).unwrap()
            + Duration::milliseconds(123);
        for (format, digits) in formats {
            for use_local in [false, true] {
                for i in 0..20 {
                    let ts = (start + Duration::milliseconds(i * 7_777_777)).trunc_subsecs(digits);
                    let name = backup_name(&ts, "foobar", ".log", format, use_local).unwrap();
                    assert_eq!(
                        timestamp_from_name(&name, "foobar", ".log", format, use_local),
                        Some(ts),
                        "format {format}, local {use_local}, name {name}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_offset_in_name_is_honored() {
        let format = "%Y-%m-%dT%H-%M-%S%.3f%z";
        assert!(validate_time_format(format).is_ok());

        let ts = Utc.with_ymd_and_hms(2023, 10, 29, 0, 30, 0).unwrap();
        for hour in 0..4 {
            let ts = ts + Duration::minutes(30 * hour);
            let name = backup_name(&ts, "foo", ".log", format, true).unwrap();
            assert_eq!(
                timestamp_from_name(&name, "foo", ".log", format, true),
                Some(ts),
                "{name}"
            );
        }
        assert_eq!(
            timestamp_from_name(
                "foo-2023-10-29T02-30-00.000+0200.log",
                "foo",
                ".log",
                format,
                true
            ),
            Some(Utc.with_ymd_and_hms(2023, 10, 29, 0, 30, 0).unwrap())
        );
        assert_eq!(
            timestamp_from_name(
                "foo-2023-10-29T02-30-00.000+0100.log",
                "foo",
                ".log",
                format,
                true
            ),
            Some(Utc.with_ymd_and_hms(2023, 10, 29, 1, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_validate_time_format() {
        assert!(validate_time_format(DEFAULT_TIME_FORMAT).is_ok());
        assert!(validate_time_format("%Y%m%d%H%M%S%3f").is_ok());
        assert!(validate_time_format("").is_err());
        assert!(validate_time_format("%Y-%m-%d").is_err());
        assert!(validate_time_format("%Q").is_err());
        assert!(validate_time_format("%Y/%m/%d %H:%M:%S").is_err());
    }
}
