use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::error::ConfigError;

pub const DEFAULT_PATTERN_CONFIG: &str = "config.json";
pub const DEFAULT_EMAIL_CONFIG: &str = "email_config.json";

/// Label -> compiled regex, in the order the labels appear in the config file.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<(String, Regex)>,
}

impl PatternSet {
    /// Compile `(label, pattern)` pairs. A repeated label replaces the earlier
    /// pattern but keeps its position, like a JSON object with duplicate keys.
    pub fn from_pairs<I, L, P>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (L, P)>,
        L: Into<String>,
        P: AsRef<str>,
    {
        let mut set = Self::default();
        for (label, pattern) in pairs {
            let label = label.into();
            let regex = Regex::new(pattern.as_ref()).map_err(|source| {
                ConfigError::InvalidPattern {
                    label: label.clone(),
                    source,
                }
            })?;
            match set.patterns.iter_mut().find(|(existing, _)| *existing == label) {
                Some(slot) => slot.1 = regex,
                None => set.patterns.push((label, regex)),
            }
        }
        Ok(set)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Regex)> {
        self.patterns.iter().map(|(label, regex)| (label.as_str(), regex))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn read_json(path: &Path) -> Result<Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the pattern config: a flat JSON object of label -> regex string.
pub fn load_patterns(path: impl AsRef<Path>) -> Result<PatternSet, ConfigError> {
    let path = path.as_ref();
    let Value::Object(map) = read_json(path)? else {
        return Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        });
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (label, value) in map {
        match value {
            Value::String(pattern) => pairs.push((label, pattern)),
            _ => return Err(ConfigError::PatternNotString { label }),
        }
    }

    let patterns = PatternSet::from_pairs(pairs)?;
    if patterns.is_empty() {
        log::warn!("No patterns defined in {:?}; nothing will ever match", path);
    }
    Ok(patterns)
}

/// SMTP settings, read from the email config file.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct EmailSettings {
    pub sender_email: String,
    pub recipient_email: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub password: String,
}

impl fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailSettings")
            .field("sender_email", &self.sender_email)
            .field("recipient_email", &self.recipient_email)
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub fn load_email_settings(path: impl AsRef<Path>) -> Result<EmailSettings, ConfigError> {
    let path = path.as_ref();
    let value = read_json(path)?;
    serde_json::from_value(value).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Identifies one version of a file on disk.
type Fingerprint = (Option<SystemTime>, u64);

fn fingerprint(path: &Path) -> Option<Fingerprint> {
    let metadata = fs::metadata(path).ok()?;
    Some((metadata.modified().ok(), metadata.len()))
}

/// Email settings with reload-on-change.
///
/// The file is re-parsed only when its modification time or size changes, so
/// credentials can be rotated while the monitor is running.
pub struct EmailSettingsSource {
    path: PathBuf,
    cached: Option<(Fingerprint, EmailSettings)>,
}

impl EmailSettingsSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: None,
        }
    }

    pub fn load(&mut self) -> Result<EmailSettings, ConfigError> {
        let current = fingerprint(&self.path);

        if let (Some(current), Some((seen, settings))) = (current, &self.cached) {
            // Without an mtime there is nothing reliable to compare against.
            if current.0.is_some() && current == *seen {
                return Ok(settings.clone());
            }
        }

        let settings = load_email_settings(&self.path)?;
        log::debug!("Loaded email settings from {:?}", self.path);
        self.cached = current.map(|fp| (fp, settings.clone()));
        Ok(settings)
    }
}
