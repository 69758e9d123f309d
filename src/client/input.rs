use clap::Parser;
use knock::config::{default_profiles_path, load_profiles};
use knock::{ConfigError, Settings};
use std::path::PathBuf;

/// Knock a sequence of ports on a remote host.
#[derive(Parser, Debug)]
#[command(name = "knock", version, about, allow_negative_numbers = true)]
pub struct Cli {
    /// Knock type (seed/seq)
    #[arg(short = 't', value_name = "TYPE")]
    pub knock_type: Option<String>,

    /// Port generation seed, used when t=seed
    #[arg(short = 's')]
    pub seed: Option<i64>,

    /// Port count, used when t=seed [default: 1]
    #[arg(short = 'c')]
    pub count: Option<i64>,

    /// Port offset, used when t=seed [default: 30000]
    #[arg(short = 'o')]
    pub offset: Option<i64>,

    /// Comma-separated custom port sequence, used when t=seq
    #[arg(short = 'q', value_name = "PORTS")]
    pub sequence: Option<String>,

    /// Protocol (tcp/tcp4/tcp6/udp/udp4/udp6) [default: udp]
    #[arg(short = 'p')]
    pub protocol: Option<String>,

    /// Local address
    #[arg(short = 'l')]
    pub local: Option<String>,

    /// Remote address
    #[arg(short = 'r')]
    pub remote: Option<String>,

    /// Loop interval, e.g. 30s or 1m30s
    #[arg(short = 'i')]
    pub interval: Option<String>,

    /// Verbose
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Profiles file [default: <config dir>/knock/profiles.toml]
    #[arg(short = 'f', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Profile to load before applying the flags above
    #[arg(short = 'n', long = "profile", value_name = "NAME")]
    pub profile: Option<String>,
}

impl Cli {
    /// Flags layered over the selected profile, if any.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let base = match &self.profile {
            Some(name) => {
                let path = match &self.config {
                    Some(path) => path.clone(),
                    None => default_profiles_path()?,
                };
                debug!("loading profile {} from {}", name, path.display());
                load_profiles(&path)?.profile(name)?
            }
            None => Settings::default(),
        };
        Ok(base.merge(self.flags()))
    }

    fn flags(&self) -> Settings {
        Settings {
            knock_type: self.knock_type.clone(),
            seed: self.seed,
            count: self.count,
            offset: self.offset,
            sequence: self.sequence.clone(),
            protocol: self.protocol.clone(),
            local: self.local.clone(),
            remote: self.remote.clone(),
            interval: self.interval.clone(),
            verbose: self.verbose.then_some(true),
        }
    }
}
