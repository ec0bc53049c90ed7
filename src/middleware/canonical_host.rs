//! Canonical host redirects.
//!
//! Sites reachable under several names (`www.`, an old domain, the bare load
//! balancer address) should answer under one. [`CanonicalHost`] describes
//! that one name and the aliases that may be served as-is; [`HostGuard`]
//! wraps the application and answers `301 Moved Permanently` for every
//! other host, keeping the scheme, port, path, and query the client used.
//!
//! The guard never fails a request. A request it cannot reason about (no
//! host, an unbuildable URL, a panicking resolver) reaches the application
//! untouched.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use http::header::{HeaderValue, LOCATION};
use http::uri::Authority;
use http::{StatusCode, Uri};
use tracing::{debug, warn};

use crate::handler::{private, BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::middleware::HostList;
use crate::request::{self, Request};
use crate::response::{ContentType, Response};

type Resolver = dyn Fn(&Request) -> Option<HostList> + Send + Sync;

/// Canonical host configuration.
///
/// Hosts come from a static [`HostList`], a per-request resolver, or both.
/// When both are set the resolver is asked first and the static list is the
/// fallback for requests it has no answer for. With neither, every request
/// passes through.
///
/// ```rust
/// use canonical_host::{CanonicalHost, Request, Response};
///
/// async fn app(_req: Request) -> Response {
///     Response::text("hello")
/// }
///
/// let guard = CanonicalHost::new(["myapp.com", "www.myapp.com"])
///     .ignore("/healthz")
///     .wrap(app);
/// # let _ = guard;
/// ```
#[derive(Clone, Default)]
pub struct CanonicalHost {
    hosts: Option<HostList>,
    resolver: Option<Arc<Resolver>>,
    ignored_paths: HashSet<String>,
}

impl CanonicalHost {
    /// Static hosts; the first is canonical.
    pub fn new(hosts: impl Into<HostList>) -> Self {
        Self { hosts: Some(hosts.into()), ..Self::default() }
    }

    /// Hosts computed per request, e.g. from a tenant table.
    pub fn resolver<F>(resolve: F) -> Self
    where
        F: Fn(&Request) -> Option<HostList> + Send + Sync + 'static,
    {
        Self::default().resolve_with(resolve)
    }

    /// Adds a resolver in front of the static hosts. `None` or an empty list
    /// from the resolver falls back to the static hosts.
    pub fn resolve_with<F>(mut self, resolve: F) -> Self
    where
        F: Fn(&Request) -> Option<HostList> + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(resolve));
        self
    }

    /// Exempts an exact path from redirection, whatever the host.
    pub fn ignore(mut self, path: impl Into<String>) -> Self {
        self.ignored_paths.insert(path.into());
        self
    }

    /// Exempts every path in `paths`, as [`ignore`](CanonicalHost::ignore).
    pub fn ignore_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_paths.extend(paths.into_iter().map(Into::<String>::into));
        self
    }

    /// Wraps `inner`, producing the handler to serve.
    pub fn wrap(self, inner: impl Handler) -> HostGuard {
        HostGuard { config: Arc::new(self), inner: inner.into_boxed_handler() }
    }

    /// The redirect `req` deserves, or `None` to pass it through.
    pub fn redirect(&self, req: &Request) -> Option<Response> {
        if self.ignored_paths.contains(req.path()) {
            return None;
        }
        let hosts = self.hosts_for(req)?;
        let target = hosts.canonical()?;

        let Some(authority) = req.authority() else {
            warn!(path = req.path(), "request carries no usable host, passing through");
            return None;
        };
        let scheme = req.scheme();
        let port = authority.port_u16();
        if hosts.accepts(authority.host(), port.unwrap_or_else(|| request::default_port(scheme))) {
            return None;
        }

        let Some(location) = canonical_url(req, scheme, target, port) else {
            warn!(canonical = target, path = req.path(), "cannot build canonical url, passing through");
            return None;
        };
        let Ok(value) = HeaderValue::from_str(&location.to_string()) else {
            warn!(%location, "canonical url is not a valid header value, passing through");
            return None;
        };

        debug!(from = %authority, to = %location, "redirecting to canonical host");
        Some(
            Response::builder()
                .status(StatusCode::MOVED_PERMANENTLY)
                .header(LOCATION, value)
                .bytes(ContentType::Html, moved_page(&location)),
        )
    }

    /// Resolver answer if it has a non-empty one, else the static hosts.
    fn hosts_for(&self, req: &Request) -> Option<Cow<'_, HostList>> {
        let resolved = self.resolver.as_ref().and_then(|resolve| {
            panic::catch_unwind(AssertUnwindSafe(|| resolve(req))).unwrap_or_else(|_| {
                warn!(path = req.path(), "host resolver panicked, using static hosts");
                None
            })
        });
        match resolved {
            Some(hosts) if !hosts.is_empty() => Some(Cow::Owned(hosts)),
            _ => self.hosts.as_ref().filter(|h| !h.is_empty()).map(Cow::Borrowed),
        }
    }
}

impl fmt::Debug for CanonicalHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanonicalHost")
            .field("hosts", &self.hosts)
            .field("resolver", &self.resolver.is_some())
            .field("ignored_paths", &self.ignored_paths)
            .finish()
    }
}

/// The request's URL moved onto `target`. A port on `target` replaces the
/// request's; otherwise the request's explicit port is kept.
///
/// Only origin-form targets (`/path?query`) have a URL to move; `*` and the
/// like yield `None`.
fn canonical_url(req: &Request, scheme: &str, target: &str, port: Option<u16>) -> Option<Uri> {
    let path_and_query = req.path_and_query();
    if !path_and_query.starts_with('/') {
        return None;
    }
    let target: Authority = target.parse().ok()?;
    request::build_url(scheme, target.host(), target.port_u16().or(port), path_and_query)
}

fn moved_page(location: &Uri) -> String {
    let location = location.to_string();
    let href = escape_html(&location);
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en-US\">\n\
         <head><title>301 Moved Permanently</title></head>\n\
         <body>\n\
         <h1>Moved Permanently</h1>\n\
         <p>The document has moved <a href=\"{href}\">here</a>.</p>\n\
         </body>\n\
         </html>\n"
    )
}

fn escape_html(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len() + 16);
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

// ── HostGuard ─────────────────────────────────────────────────────────────────

/// A handler that redirects off-canonical requests and delegates the rest.
///
/// Built by [`CanonicalHost::wrap`]. Cheap to share: the configuration is
/// immutable and behind an `Arc`.
#[derive(Clone)]
pub struct HostGuard {
    config: Arc<CanonicalHost>,
    inner: BoxedHandler,
}

impl HostGuard {
    pub fn config(&self) -> &CanonicalHost {
        &self.config
    }

    /// Answers one request: the redirect, or whatever the wrapped handler
    /// returns for the unmodified request.
    pub async fn handle(&self, req: Request) -> Response {
        self.call(req).await
    }
}

impl ErasedHandler for HostGuard {
    fn call(&self, req: Request) -> BoxFuture {
        match self.config.redirect(&req) {
            Some(res) => Box::pin(future::ready(res)),
            None => self.inner.call(req),
        }
    }
}

impl private::Sealed for HostGuard {}

impl Handler for HostGuard {
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(self)
    }
}

impl fmt::Debug for HostGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostGuard").field("config", &self.config).finish_non_exhaustive()
    }
}
