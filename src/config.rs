//! Wayfarer configuration.
//!
//! Loaded from `<home>/config.toml`, where `<home>` is `$WAYFARER_HOME` or
//! `~/.wayfarer`. Every key is optional; a missing file means defaults.

use std::path::PathBuf;
use std::{env, fs};

use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the Wayfarer home directory.
pub const HOME_ENV: &str = "WAYFARER_HOME";

/// Wayfarer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Where the database lives. Defaults to the Wayfarer home directory.
    pub data_dir: Option<PathBuf>,

    /// IANA time zone used to bucket photos into months, e.g. `Europe/Paris`.
    /// Defaults to the system zone.
    pub time_zone: Option<String>,

    /// Default log filter when `WAYFARER_LOG` is unset, e.g. `wayfarer=debug`.
    pub log: Option<String>,
}

impl Config {
    /// Load config from `<home>/config.toml`.
    /// Returns defaults if the file is missing, an error if it is invalid.
    pub fn load() -> Result<Self, String> {
        let home = Self::home().ok_or("could not determine home directory")?;
        Self::load_from(&home.join("config.toml"))
    }

    fn load_from(path: &std::path::Path) -> Result<Self, String> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The Wayfarer home directory: `$WAYFARER_HOME`, else `~/.wayfarer`.
    pub fn home() -> Option<PathBuf> {
        if let Ok(dir) = env::var(HOME_ENV)
            && !dir.is_empty()
        {
            return Some(PathBuf::from(dir));
        }
        dirs::home_dir().map(|h| h.join(".wayfarer"))
    }

    /// The storage root: `data-dir` if set, else the home directory.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(Self::home)
    }

    /// The zone for month bucketing.
    ///
    /// Falls back to the system zone when unset, and to UTC when the
    /// configured name is unknown.
    pub fn time_zone(&self) -> TimeZone {
        match &self.time_zone {
            Some(name) => TimeZone::get(name).unwrap_or_else(|e| {
                tracing::warn!(zone = %name, error = %e, "unknown time zone, using UTC");
                TimeZone::UTC
            }),
            None => TimeZone::system(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn parses_kebab_case_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "data-dir = \"/tmp/journals\"\ntime-zone = \"UTC\"\nlog = \"wayfarer=debug\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/journals")));
        assert_eq!(config.data_dir(), Some(PathBuf::from("/tmp/journals")));
        assert_eq!(config.time_zone.as_deref(), Some("UTC"));
        assert_eq!(config.log.as_deref(), Some("wayfarer=debug"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "theme = \"dark\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.contains("invalid config"));
    }
}
