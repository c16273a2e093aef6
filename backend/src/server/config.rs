//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use crate::outbound::identity::IdentityProviderSettings;
use crate::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
///
/// The database pool and identity settings are optional; when either is
/// missing the server falls back to seeded in-memory fixtures, which is only
/// suitable for local development.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) identity: Option<IdentityProviderSettings>,
}

impl ServerConfig {
    /// Construct a server configuration binding to `bind_addr`.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            identity: None,
        }
    }

    /// Attach a database connection pool for the profile store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach connection settings for the identity provider.
    #[must_use]
    pub fn with_identity(mut self, identity: IdentityProviderSettings) -> Self {
        self.identity = Some(identity);
        self
    }

    /// The socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
