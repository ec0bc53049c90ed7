//! Incoming HTTP request type.
//!
//! Besides plain accessors, [`Request`] answers the questions a proxy-aware
//! middleware asks: which host did the *client* address, over which scheme,
//! and what URL did it see. Every answer is derived from the request on
//! demand; nothing is cached.

use bytes::Bytes;
use http::request::Parts;
use http::uri::{Authority, Scheme};
use http::{HeaderMap, Method, Uri};

/// Header set by reverse proxies to carry the client-facing host.
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Header set by reverse proxies to carry the client-facing scheme.
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// An incoming HTTP request with its body fully read.
#[derive(Debug)]
pub struct Request {
    parts: Parts,
    body: Bytes,
}

impl Request {
    pub fn new(parts: Parts, body: Bytes) -> Self {
        Self { parts, body }
    }

    pub fn method(&self) -> &Method { &self.parts.method }
    pub fn uri(&self) -> &Uri { &self.parts.uri }
    pub fn path(&self) -> &str { self.parts.uri.path() }
    pub fn query(&self) -> Option<&str> { self.parts.uri.query() }
    pub fn headers(&self) -> &HeaderMap { &self.parts.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Values that are not visible ASCII read
    /// as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// First value of `X-Forwarded-Host`, if present and non-empty.
    ///
    /// Proxies append to the header as a request hops through them, so the
    /// first entry is the host the client originally addressed.
    pub fn forwarded_host(&self) -> Option<&str> {
        first_value(self.header(X_FORWARDED_HOST)?)
    }

    /// The authority the client addressed: the forwarded host if present,
    /// else the `Host` header, else the authority of an absolute-form URI
    /// (HTTP/2 `:authority`).
    ///
    /// Returns `None` when none is present or the value does not parse.
    pub fn authority(&self) -> Option<Authority> {
        let raw = self
            .forwarded_host()
            .or_else(|| self.header(http::header::HOST.as_str()).and_then(first_value))
            .or_else(|| self.parts.uri.authority().map(Authority::as_str))?;
        raw.parse().ok()
    }

    /// Hostname of [`authority`](Request::authority), without the port.
    pub fn host(&self) -> Option<String> {
        self.authority().map(|a| a.host().to_owned())
    }

    /// Explicit port of [`authority`](Request::authority), if any.
    pub fn port(&self) -> Option<u16> {
        self.authority().and_then(|a| a.port_u16())
    }

    /// `"https"` or `"http"`.
    ///
    /// The first `X-Forwarded-Proto` value wins over the URI scheme, which
    /// for HTTP/2 is the transport's. Anything else is plain `http`.
    pub fn scheme(&self) -> &'static str {
        let proto = self
            .header(X_FORWARDED_PROTO)
            .and_then(first_value)
            .or_else(|| self.parts.uri.scheme_str());
        match proto {
            Some(p) if p.eq_ignore_ascii_case("https") => "https",
            _ => "http",
        }
    }

    /// The full URL as the client saw it, default port omitted.
    pub fn url(&self) -> Option<Uri> {
        let authority = self.authority()?;
        build_url(self.scheme(), authority.host(), authority.port_u16(), self.path_and_query())
    }

    pub(crate) fn path_and_query(&self) -> &str {
        self.parts.uri.path_and_query().map_or("/", |pq| pq.as_str())
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self::new(parts, body)
    }
}

/// Assembles `scheme://host[:port]/path?query`, dropping the port when it is
/// the scheme's default.
pub(crate) fn build_url(
    scheme: &str,
    host: &str,
    port: Option<u16>,
    path_and_query: &str,
) -> Option<Uri> {
    let authority = match port {
        Some(p) if p != default_port(scheme) => format!("{host}:{p}"),
        _ => host.to_owned(),
    };
    Uri::builder()
        .scheme(scheme)
        .authority(authority)
        .path_and_query(path_and_query)
        .build()
        .ok()
}

/// 443 for `https`, 80 for everything else.
pub(crate) fn default_port(scheme: &str) -> u16 {
    if scheme == Scheme::HTTPS.as_str() { 443 } else { 80 }
}

fn first_value(raw: &str) -> Option<&str> {
    raw.split(',').map(str::trim).find(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str, headers: &[(&str, &str)]) -> Request {
        let mut builder = http::Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Bytes::new()).unwrap().into()
    }

    #[test]
    fn host_header_is_the_effective_host() {
        let req = request("/test/path", &[("host", "myapp.com:8080")]);
        assert_eq!(req.host().as_deref(), Some("myapp.com"));
        assert_eq!(req.port(), Some(8080));
    }

    #[test]
    fn forwarded_host_wins_over_host_header() {
        let req = request(
            "/test/path",
            &[("host", "localhost:81"), ("x-forwarded-host", "myapp.com")],
        );
        assert_eq!(req.host().as_deref(), Some("myapp.com"));
        assert_eq!(req.port(), None);
    }

    #[test]
    fn first_forwarded_host_is_used() {
        let req = request(
            "/",
            &[("host", "localhost"), ("x-forwarded-host", "client.com, proxy.internal")],
        );
        assert_eq!(req.forwarded_host(), Some("client.com"));
    }

    #[test]
    fn blank_forwarded_host_falls_back_to_host() {
        let req = request("/", &[("host", "myapp.com"), ("x-forwarded-host", " ")]);
        assert_eq!(req.forwarded_host(), None);
        assert_eq!(req.host().as_deref(), Some("myapp.com"));
    }

    #[test]
    fn absolute_uri_supplies_host_and_scheme() {
        let req = request("https://myapp.com/a?b=c", &[]);
        assert_eq!(req.host().as_deref(), Some("myapp.com"));
        assert_eq!(req.scheme(), "https");
        assert_eq!(req.url().unwrap().to_string(), "https://myapp.com/a?b=c");
    }

    #[test]
    fn forwarded_proto_sets_scheme() {
        let req = request("/", &[("host", "myapp.com"), ("x-forwarded-proto", "HTTPS")]);
        assert_eq!(req.scheme(), "https");
    }

    #[test]
    fn forwarded_proto_wins_over_uri_scheme() {
        let req = request("http://myapp.com/", &[("x-forwarded-proto", "https")]);
        assert_eq!(req.scheme(), "https");
        assert_eq!(req.url().unwrap().to_string(), "https://myapp.com/");
    }

    #[test]
    fn url_drops_default_port_and_keeps_query() {
        let req = request("/search?q=rust&page=2", &[("host", "myapp.com:80")]);
        assert_eq!(req.url().unwrap().to_string(), "http://myapp.com/search?q=rust&page=2");

        let req = request("/", &[("host", "myapp.com:81")]);
        assert_eq!(req.url().unwrap().to_string(), "http://myapp.com:81/");
    }

    #[test]
    fn missing_host_has_no_url() {
        let req = request("/", &[]);
        assert!(req.authority().is_none());
        assert!(req.url().is_none());
    }
}
