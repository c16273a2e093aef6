//! Campus backend library: user administration over HTTP.
//!
//! The crate follows a hexagonal layout. `domain` holds the transport-agnostic
//! core and its ports, `inbound` the actix-web adapters, `outbound` the
//! identity-provider client and the PostgreSQL profile store, and `server` the
//! wiring that assembles them into a running service.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request tracing middleware attaching a trace id to every request.
pub use middleware::trace::Trace;
