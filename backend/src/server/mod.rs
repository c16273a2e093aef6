//! HTTP server assembly: configuration, adapter wiring, and route setup.

mod config;
mod state_builders;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::users::{
    create_user, delete_user, get_user, list_users, reset_password, update_role, update_user,
};
use crate::middleware::trace::Trace;
use crate::outbound::identity::IdentitySetupError;

pub use config::ServerConfig;
pub use state_builders::FIXTURE_ADMIN_TOKEN;
use state_builders::build_http_state;

/// Raised when the server cannot be assembled or bound.
#[derive(Debug, thiserror::Error)]
pub enum ServerSetupError {
    /// The identity HTTP client could not be constructed.
    #[error(transparent)]
    Identity(#[from] IdentitySetupError),
    /// The listening socket could not be bound.
    #[error("failed to bind {0}")]
    Bind(#[from] std::io::Error),
}

/// Assemble the HTTP server from the configuration.
///
/// The caller owns the health state so it can flip readiness once the server
/// is running.
///
/// # Errors
/// Returns [`ServerSetupError`] when adapter wiring fails or the bind address
/// is unavailable.
pub fn create_server(
    config: ServerConfig,
    health_state: web::Data<HealthState>,
) -> Result<Server, ServerSetupError> {
    let state = web::Data::new(build_http_state(&config)?);

    let server = HttpServer::new(move || {
        let api = web::scope("/api/v1")
            .service(list_users)
            .service(create_user)
            .service(get_user)
            .service(update_user)
            .service(delete_user)
            .service(reset_password)
            .service(update_role);

        let app = App::new()
            .app_data(state.clone())
            .app_data(health_state.clone())
            .wrap(Trace)
            .service(api)
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app = app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );

        app
    })
    .bind(config.bind_addr)?;

    Ok(server.run())
}
