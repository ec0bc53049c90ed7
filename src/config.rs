//! Declarative configuration for [`CanonicalHost`].
//!
//! The builder on [`CanonicalHost`] is the code-first way in. [`Config`] is
//! the deploy-time way: deserialize it from a config file or read it from the
//! environment, then convert. Conversion validates every host, so a typo
//! fails at startup instead of silently disabling redirects.
//!
//! ```rust
//! use canonical_host::{CanonicalHost, Config};
//!
//! let config: Config = Config::from_lookup(|key| match key {
//!     "CANONICAL_HOST" => Some("myapp.com,www.myapp.com".to_owned()),
//!     _ => None,
//! });
//! let canonical = CanonicalHost::try_from(config).unwrap();
//! # let _ = canonical;
//! ```

use http::uri::Authority;
use serde::Deserialize;

use crate::error::Error;
use crate::middleware::{CanonicalHost, HostList};

/// Comma-separated acceptable hosts; the first is canonical.
pub const HOST_VAR: &str = "CANONICAL_HOST";

/// Comma-separated exact paths exempt from redirection.
pub const IGNORED_PATHS_VAR: &str = "CANONICAL_HOST_IGNORED_PATHS";

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// A single host or a list of hosts. Absent disables redirects.
    pub host: Option<HostList>,
    pub ignored_paths: Vec<String>,
}

impl Config {
    /// Reads [`HOST_VAR`] and [`IGNORED_PATHS_VAR`] from the process
    /// environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Config::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup(HOST_VAR)
            .map(|raw| HostList::new(raw.split(',')))
            .filter(|hosts| !hosts.is_empty());
        let ignored_paths: Vec<String> = lookup(IGNORED_PATHS_VAR)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        Self { host, ignored_paths }
    }

    /// Checks that every host is a bare `host[:port]`: no scheme, path, or
    /// userinfo.
    pub fn validate(&self) -> Result<(), Error> {
        for host in self.host.iter().flat_map(HostList::iter) {
            if host.parse::<Authority>().is_err() || host.contains('@') {
                return Err(Error::InvalidHost(host.to_owned()));
            }
        }
        Ok(())
    }
}

impl TryFrom<Config> for CanonicalHost {
    type Error = Error;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        config.validate()?;
        let canonical = match config.host {
            Some(hosts) => CanonicalHost::new(hosts),
            None => CanonicalHost::default(),
        };
        Ok(canonical.ignore_paths(config.ignored_paths))
    }
}
