use std::sync::{Arc, Mutex};

use bytes::Bytes;
use canonical_host::{CanonicalHost, HostGuard, HostList, Request, Response};
use http::{HeaderMap, Method, StatusCode, Uri};

/// What the wrapped application saw.
#[derive(Debug, PartialEq)]
struct Seen {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl Seen {
    fn of(req: &Request) -> Self {
        Self {
            method: req.method().clone(),
            uri: req.uri().clone(),
            headers: req.headers().clone(),
            body: Bytes::copy_from_slice(req.body()),
        }
    }
}

fn parent_response() -> Response {
    Response::text("Success")
}

/// Wraps an application that records every request it receives.
fn stack(canonical: CanonicalHost) -> (HostGuard, Arc<Mutex<Vec<Seen>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let app = move |req: Request| {
        log.lock().unwrap().push(Seen::of(&req));
        async { parent_response() }
    };
    (canonical.wrap(app), seen)
}

/// A request for `url` as a browser sends it straight to the service.
fn direct(url: &str) -> Request {
    let uri: Uri = url.parse().unwrap();
    http::Request::get(uri.path_and_query().unwrap().as_str())
        .header("host", uri.authority().unwrap().as_str())
        .header("user-agent", "curl/8.5.0")
        .body(Bytes::from_static(b"payload"))
        .unwrap()
        .into()
}

/// The same request after a reverse proxy on `localhost:81` forwarded it.
fn forwarded(url: &str) -> Request {
    let uri: Uri = url.parse().unwrap();
    http::Request::get(uri.path_and_query().unwrap().as_str())
        .header("host", "localhost:81")
        .header("x-forwarded-host", uri.authority().unwrap().as_str())
        .body(Bytes::new())
        .unwrap()
        .into()
}

async fn assert_passes_through(canonical: CanonicalHost, build: fn(&str) -> Request, url: &str) {
    let (guard, seen) = stack(canonical);
    let res = guard.handle(build(url)).await;

    assert_eq!(res, parent_response());
    assert_eq!(*seen.lock().unwrap(), [Seen::of(&build(url))]);
}

async fn assert_redirects(
    canonical: CanonicalHost,
    build: fn(&str) -> Request,
    url: &str,
    location: &str,
) {
    let (guard, seen) = stack(canonical);
    let res = guard.handle(build(url)).await;

    assert_eq!(res.status_code(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.header("location"), Some(location));
    assert_eq!(res.header("content-type"), Some("text/html"));
    assert!(std::str::from_utf8(res.body()).unwrap().contains(location));
    assert!(seen.lock().unwrap().is_empty(), "application must not be called");
}

// ── Single host ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn matching_host_passes_through() {
    for build in [direct, forwarded] {
        assert_passes_through(CanonicalHost::new("myapp.com"), build, "http://myapp.com/test/path")
            .await;
    }
}

#[tokio::test]
async fn non_matching_host_redirects() {
    for build in [direct, forwarded] {
        assert_redirects(
            CanonicalHost::new("new-host.com"),
            build,
            "http://myapp.com/test/path",
            "http://new-host.com/test/path",
        )
        .await;
    }
}

#[tokio::test]
async fn redirects_onto_configured_host() {
    assert_redirects(
        CanonicalHost::new("myapp.com"),
        direct,
        "http://new-host.com/test/path",
        "http://myapp.com/test/path",
    )
    .await;
}

// ── Secondary hosts ──────────────────────────────────────────────────────────

#[tokio::test]
async fn canonical_of_a_list_passes_through() {
    for build in [direct, forwarded] {
        assert_passes_through(
            CanonicalHost::new(["myapp.com", "secondary.com"]),
            build,
            "http://myapp.com/test/path",
        )
        .await;
    }
}

#[tokio::test]
async fn secondary_host_passes_through() {
    for build in [direct, forwarded] {
        assert_passes_through(
            CanonicalHost::new(["myapp.com", "secondary.com"]),
            build,
            "http://secondary.com/test/path",
        )
        .await;
    }
}

#[tokio::test]
async fn host_outside_the_list_goes_to_the_first_entry() {
    for build in [direct, forwarded] {
        assert_redirects(
            CanonicalHost::new(["new-host.com", "secondary.com"]),
            build,
            "http://myapp.com/test/path",
            "http://new-host.com/test/path",
        )
        .await;
    }
}

// ── Resolver ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn resolver_host_passes_through() {
    let canonical = CanonicalHost::resolver(|_| Some("block-host.com".into()));
    assert_passes_through(canonical, direct, "http://block-host.com/").await;
}

#[tokio::test]
async fn resolver_host_is_the_redirect_target() {
    let canonical = CanonicalHost::resolver(|_| Some("block-host.com".into()));
    assert_redirects(canonical, direct, "http://different-host.com/path", "http://block-host.com/path")
        .await;
}

#[tokio::test]
async fn resolver_overrides_static_host() {
    let canonical =
        CanonicalHost::new("static.com").resolve_with(|_| Some(HostList::from("block-host.com")));
    assert_redirects(canonical, direct, "http://static.com/path", "http://block-host.com/path").await;
}

#[tokio::test]
async fn resolver_without_answer_uses_static_host() {
    let canonical = CanonicalHost::new("static.com").resolve_with(|req: &Request| {
        req.header("x-tenant").map(|tenant| HostList::from(format!("{tenant}.example.com")))
    });
    assert_redirects(canonical.clone(), direct, "http://other.com/path", "http://static.com/path")
        .await;

    let (guard, _) = stack(canonical);
    let req: Request = http::Request::get("/path")
        .header("host", "other.com")
        .header("x-tenant", "acme")
        .body(Bytes::new())
        .unwrap()
        .into();
    let res = guard.handle(req).await;
    assert_eq!(res.header("location"), Some("http://acme.example.com/path"));
}

// ── Pass-through rules ───────────────────────────────────────────────────────

#[tokio::test]
async fn ignored_path_passes_through_on_any_host() {
    let canonical = CanonicalHost::new("myapp.com").ignore("/test/path");
    assert_passes_through(canonical, direct, "http://new-host.com/test/path").await;
}

#[tokio::test]
async fn unconfigured_guard_passes_through() {
    assert_passes_through(CanonicalHost::default(), direct, "http://new-host.com/test/path").await;
}

#[tokio::test]
async fn query_and_port_are_preserved() {
    assert_redirects(
        CanonicalHost::new("myapp.com"),
        direct,
        "http://new-host.com:8080/search?q=canonical",
        "http://myapp.com:8080/search?q=canonical",
    )
    .await;
}

#[tokio::test]
async fn forwarded_proto_keeps_https() {
    let (guard, _) = stack(CanonicalHost::new("myapp.com"));
    let req: Request = http::Request::get("/login")
        .header("host", "localhost:81")
        .header("x-forwarded-host", "www.myapp.com")
        .header("x-forwarded-proto", "https")
        .body(Bytes::new())
        .unwrap()
        .into();
    let res = guard.handle(req).await;
    assert_eq!(res.header("location"), Some("https://myapp.com/login"));
}
