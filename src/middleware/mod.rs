//! Middleware layer.
//!
//! A middleware is a [`Handler`](crate::Handler) that owns another handler
//! and decides, per request, whether to answer itself or delegate. It is
//! built once at startup by wrapping the application and served like any
//! other handler:
//!
//! ```rust,no_run
//! use canonical_host::{CanonicalHost, Request, Response, Server};
//!
//! async fn app(_req: Request) -> Response {
//!     Response::text("hello")
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = CanonicalHost::new("myapp.com").wrap(app);
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//! ```
//!
//! Built-in middleware:
//! - [`CanonicalHost`] — `301` every request onto one canonical hostname

mod canonical_host;
mod host_list;

pub use canonical_host::{CanonicalHost, HostGuard};
pub use host_list::HostList;
