use serde_derive::Deserialize;
use std::path::PathBuf;

#[cfg(any(feature = "json", feature = "toml", feature = "yaml"))]
use crate::RollError;

/// Settings of a [`RollingFileWriter`](crate::RollingFileWriter), as they are decoded from
/// a structured configuration.
///
/// All fields are optional; missing fields take the default values described below.
/// With [`LoggerConfig::from_json_str`], [`LoggerConfig::from_toml_str`] and
/// [`LoggerConfig::from_yaml_str`], the keys are matched case-insensitively.
///
/// ```toml
/// filename = "/var/log/myapp/myapp.log"
/// maxsize = 50
/// maxage = 28
/// maxbackups = 10
/// localtime = false
/// compress = true
/// keeplastdecompressed = 2
/// timeformat = "%Y-%m-%dT%H-%M-%S%.3f"
/// backupdir = "/var/log/myapp/archive"
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggerConfig {
    /// Path of the active log file.
    /// If empty, `<program name>-rollsink.log` in the system's temp directory is used.
    pub filename: PathBuf,

    /// Size in megabytes at which the active file is rotated; 0 means 100 megabytes.
    #[serde(rename = "maxsize")]
    pub max_size: u64,

    /// Number of days after which backups are removed; 0 means backups never expire.
    #[serde(rename = "maxage")]
    pub max_age: u64,

    /// Number of backups that are kept; 0 means all backups are kept.
    #[serde(rename = "maxbackups")]
    pub max_backups: usize,

    /// Whether the timestamps in backup file names use local time rather than UTC.
    #[serde(rename = "localtime")]
    pub local_time: bool,

    /// Whether backups are compressed with gzip.
    pub compress: bool,

    /// Number of newest backups that are left uncompressed when `compress` is set.
    #[serde(rename = "keeplastdecompressed")]
    pub keep_last_decompressed: usize,

    /// chrono strftime format of the timestamps in backup file names;
    /// empty means [`DEFAULT_TIME_FORMAT`](crate::naming::DEFAULT_TIME_FORMAT).
    #[serde(rename = "timeformat")]
    pub time_format: String,

    /// Folder for the backups; empty means the folder of the active file.
    #[serde(rename = "backupdir")]
    pub backup_dir: PathBuf,
}

impl LoggerConfig {
    /// Decodes the configuration from a JSON object.
    ///
    /// # Errors
    ///
    /// [`RollError::Json`] if the input is not a JSON object or a value has the wrong type.
    #[cfg_attr(docsrs, doc(cfg(feature = "json")))]
    #[cfg(feature = "json")]
    pub fn from_json_str(s: &str) -> Result<Self, RollError> {
        let value = match serde_json::from_str::<serde_json::Value>(s)? {
            serde_json::Value::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k.to_lowercase(), v))
                    .collect(),
            ),
            other => other,
        };
        Ok(serde_json::from_value(value)?)
    }

    /// Decodes the configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// [`RollError::Toml`] if the input is no valid TOML or a value has the wrong type.
    #[cfg_attr(docsrs, doc(cfg(feature = "toml")))]
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self, RollError> {
        let table: toml::Table = toml::from_str(s)?;
        let lowercased: toml::Table = table
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        Ok(toml::Value::Table(lowercased).try_into()?)
    }

    /// Decodes the configuration from a YAML document.
    ///
    /// # Errors
    ///
    /// [`RollError::Yaml`] if the input is no valid YAML or a value has the wrong type.
    #[cfg_attr(docsrs, doc(cfg(feature = "yaml")))]
    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(s: &str) -> Result<Self, RollError> {
        use serde_yaml::Value;
        let value = match serde_yaml::from_str::<Value>(s)? {
            Value::Mapping(map) => Value::Mapping(
                map.into_iter()
                    .map(|(k, v)| match k {
                        Value::String(k) => (Value::String(k.to_lowercase()), v),
                        k => (k, v),
                    })
                    .collect(),
            ),
            other => other,
        };
        Ok(serde_yaml::from_value(value)?)
    }
}
