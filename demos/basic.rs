//! A hello-world service that answers under one hostname only.
//!
//! Run with:
//!   CANONICAL_HOST=localhost,127.0.0.1 CANONICAL_HOST_IGNORED_PATHS=/healthz \
//!     cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/hello?name=alice      # 200
//!   curl -i -H 'host: old.example' http://localhost:3000/hello?name=alice
//!                                                       # 301 → http://localhost/hello?name=alice
//!   curl -i -H 'x-forwarded-host: old.example' -H 'x-forwarded-proto: https' \
//!        http://localhost:3000/                         # 301 → https://localhost/
//!   curl -i -H 'host: 10.0.0.7' http://localhost:3000/healthz
//!                                                       # 200, ignored path

use canonical_host::{CanonicalHost, Config, Request, Response, Server};

#[tokio::main]
async fn main() -> Result<(), canonical_host::Error> {
    tracing_subscriber::fmt::init();

    let canonical = CanonicalHost::try_from(Config::from_env())?;
    tracing::info!(?canonical, "canonical host configured");

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_owned());
    Server::try_bind(&addr)?.serve(canonical.wrap(app)).await
}

async fn app(req: Request) -> Response {
    match req.path() {
        "/healthz" => Response::text("ok"),
        _ => Response::text(format!("hello from {}\n", req.host().unwrap_or_default())),
    }
}
