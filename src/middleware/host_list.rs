//! Ordered list of acceptable hostnames.

use http::uri::Authority;
use serde::Deserialize;

/// The hostnames a request may arrive on. The first entry is canonical:
/// requests on any other host are redirected to it.
///
/// Entries are `host` or `host:port`. Blank entries are dropped on
/// construction, so a list is either empty (canonicalization off) or has a
/// canonical target.
///
/// ```rust
/// use canonical_host::HostList;
///
/// let hosts = HostList::from(["myapp.com", "www.myapp.com"]);
/// assert_eq!(hosts.canonical(), Some("myapp.com"));
/// assert!(hosts.accepts("WWW.MYAPP.COM", 80));
/// assert!(!hosts.accepts("other.com", 80));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct HostList(Vec<String>);

impl HostList {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        hosts.into_iter().collect()
    }

    /// The redirect target.
    pub fn canonical(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether a request for `host` on `port` is already on an acceptable
    /// host. Hostnames compare ASCII case-insensitively; an entry without a
    /// port accepts any port.
    pub fn accepts(&self, host: &str, port: u16) -> bool {
        self.0.iter().any(|entry| match entry.parse::<Authority>() {
            Ok(a) => {
                a.host().eq_ignore_ascii_case(host) && a.port_u16().is_none_or(|p| p == port)
            }
            Err(_) => entry.eq_ignore_ascii_case(host),
        })
    }
}

impl<S: Into<String>> FromIterator<S> for HostList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(Into::into)
                .map(|h: String| h.trim().to_owned())
                .filter(|h| !h.is_empty())
                .collect(),
        )
    }
}

impl From<&str> for HostList {
    fn from(host: &str) -> Self {
        Self::new([host])
    }
}

impl From<String> for HostList {
    fn from(host: String) -> Self {
        Self::new([host])
    }
}

impl<S: Into<String>> From<Vec<S>> for HostList {
    fn from(hosts: Vec<S>) -> Self {
        Self::new(hosts)
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for HostList {
    fn from(hosts: [S; N]) -> Self {
        Self::new(hosts)
    }
}

/// Config files spell a single host as a string and several as a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for HostList {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(host) => host.into(),
            OneOrMany::Many(hosts) => hosts.into(),
        }
    }
}
