//! # canonical-host
//!
//! One hostname per site. Requests that reach your service under any other
//! name get a `301 Moved Permanently` to the same path and query on the
//! canonical host; everything else reaches your handler untouched.
//!
//! ## Behind a proxy
//!
//! nginx or the ingress terminates TLS and forwards plain HTTP, so the `Host`
//! header the service sees is often an internal name. The guard decides on
//! the host the *client* used:
//!
//! - `X-Forwarded-Host` (first value) when present, else `Host`
//! - `X-Forwarded-Proto` for the scheme of the redirect
//!
//! Only put this behind a proxy that sets or strips those headers.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use canonical_host::{CanonicalHost, HostList, Request, Response, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = CanonicalHost::new(["myapp.com", "www.myapp.com"])
//!         .resolve_with(|req: &Request| {
//!             // per-tenant domains; `None` falls back to the static list
//!             req.header("x-tenant-domain").map(HostList::from)
//!         })
//!         .ignore("/healthz")
//!         .wrap(hello);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn hello(_req: Request) -> Response {
//!     Response::text("hello")
//! }
//! ```
//!
//! The guard never turns a request into an error. With no hosts configured,
//! or a request it cannot make sense of, it passes the request through.

mod config;
mod error;
mod handler;
mod request;
mod response;
mod server;

pub mod middleware;

pub use config::{Config, HOST_VAR, IGNORED_PATHS_VAR};
pub use error::Error;
pub use handler::Handler;
pub use middleware::{CanonicalHost, HostGuard, HostList};
pub use request::{Request, X_FORWARDED_HOST, X_FORWARDED_PROTO};
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use server::Server;
