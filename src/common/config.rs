use crate::errors::ConfigError;
use crate::sequence::{parse_literal, PortSource};
use crate::transport::TransportKind;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_KNOCK_TYPE: &str = "seed";
pub const DEFAULT_SEED: i64 = 0;
pub const DEFAULT_COUNT: i64 = 1;
pub const DEFAULT_OFFSET: i64 = 30000;
pub const DEFAULT_PROTOCOL: &str = "udp";

/// Validated knock parameters. Built once, never changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct KnockConfig {
    pub transport: TransportKind,
    pub local: String,
    pub remote: String,
    /// Pause between cycles; zero runs a single cycle.
    pub interval: Duration,
    pub verbose: bool,
    pub source: PortSource,
}

/// Raw, unvalidated knock parameters. Every field is optional so that layers
/// (profile file, command line) can be stacked with [`Settings::merge`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(rename = "type")]
    pub knock_type: Option<String>,
    pub seed: Option<i64>,
    pub count: Option<i64>,
    pub offset: Option<i64>,
    pub sequence: Option<String>,
    pub protocol: Option<String>,
    pub local: Option<String>,
    pub remote: Option<String>,
    pub interval: Option<String>,
    pub verbose: Option<bool>,
}

impl Settings {
    /// Values set in `over` win.
    pub fn merge(self, over: Settings) -> Settings {
        Settings {
            knock_type: over.knock_type.or(self.knock_type),
            seed: over.seed.or(self.seed),
            count: over.count.or(self.count),
            offset: over.offset.or(self.offset),
            sequence: over.sequence.or(self.sequence),
            protocol: over.protocol.or(self.protocol),
            local: over.local.or(self.local),
            remote: over.remote.or(self.remote),
            interval: over.interval.or(self.interval),
            verbose: over.verbose.or(self.verbose),
        }
    }
}

impl TryFrom<Settings> for KnockConfig {
    type Error = ConfigError;

    fn try_from(s: Settings) -> Result<Self, Self::Error> {
        let knock_type = s.knock_type.as_deref().unwrap_or(DEFAULT_KNOCK_TYPE);
        let source = match knock_type {
            "seed" => PortSource::Seeded {
                seed: s.seed.unwrap_or(DEFAULT_SEED),
                count: s.count.unwrap_or(DEFAULT_COUNT),
                offset: s.offset.unwrap_or(DEFAULT_OFFSET),
            },
            "seq" => PortSource::Literal {
                ports: parse_literal(s.sequence.as_deref().unwrap_or_default())?,
            },
            other => return Err(ConfigError::InvalidKnockType(other.to_owned())),
        };
        let transport = s
            .protocol
            .as_deref()
            .unwrap_or(DEFAULT_PROTOCOL)
            .parse::<TransportKind>()?;
        let interval = parse_interval(s.interval.as_deref().unwrap_or_default())?;
        Ok(KnockConfig {
            transport,
            local: s.local.unwrap_or_default(),
            remote: s.remote.unwrap_or_default(),
            interval,
            verbose: s.verbose.unwrap_or(false),
            source,
        })
    }
}

/// Named knock profiles, one `[profiles.<name>]` table each.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileFile {
    #[serde(default)]
    pub profiles: HashMap<String, Settings>,
}

impl ProfileFile {
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn profile(&self, name: &str) -> Result<Settings, ConfigError> {
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_owned()))
    }
}

// <config dir>/knock/profiles.toml
pub fn default_profiles_path() -> Result<PathBuf, ConfigError> {
    let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(dir.join("knock").join("profiles.toml"))
}

pub fn load_profiles(path: &Path) -> Result<ProfileFile, ConfigError> {
    let file_error = |reason: String| ConfigError::File {
        path: path.display().to_string(),
        reason,
    };
    let content = fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
    ProfileFile::parse(&content).map_err(|e| file_error(e.to_string()))
}

/// Parse a duration such as `1s`, `250ms`, `1m30s` or `1.5h`.
///
/// An empty string is a zero interval. Units: `ns`, `us`/`µs`, `ms`, `s`,
/// `m`, `h`. A bare `0` is accepted, as is a leading `+`. Negative intervals
/// are rejected.
pub fn parse_interval(value: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidInterval {
        value: value.to_owned(),
        reason: reason.to_owned(),
    };
    if value.starts_with('-') {
        return Err(invalid("negative durations are not allowed"));
    }
    let unsigned = value.strip_prefix('+').unwrap_or(value);
    if unsigned.is_empty() && !value.is_empty() {
        return Err(invalid("expected a number"));
    }
    if unsigned.is_empty() || unsigned == "0" {
        return Ok(Duration::ZERO);
    }

    let mut nanos = 0f64;
    let mut rest = unsigned;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        if number.is_empty() || number == "." {
            return Err(invalid("expected a number"));
        }
        let amount: f64 = number.parse().map_err(|_| invalid("malformed number"))?;
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let unit_nanos = match unit {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            "" => return Err(invalid("missing unit")),
            _ => return Err(invalid("unknown unit")),
        };
        nanos += (amount * unit_nanos).round();
        rest = tail;
    }
    if nanos >= u64::MAX as f64 {
        return Err(invalid("out of range"));
    }
    Ok(Duration::from_nanos(nanos as u64))
}
