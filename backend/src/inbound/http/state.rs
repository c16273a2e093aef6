//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data`, so they depend only on
//! domain ports and stay testable without real infrastructure.

use std::sync::Arc;

use crate::domain::ports::{AccessControl, UserDirectoryQuery, UserProvisioningCommand};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Token verification and role gating.
    pub access: Arc<dyn AccessControl>,
    /// Read side of the user directory.
    pub directory: Arc<dyn UserDirectoryQuery>,
    /// Write side of user administration.
    pub provisioning: Arc<dyn UserProvisioningCommand>,
}

impl HttpState {
    /// Bundle the three ports handlers need.
    pub fn new(
        access: Arc<dyn AccessControl>,
        directory: Arc<dyn UserDirectoryQuery>,
        provisioning: Arc<dyn UserProvisioningCommand>,
    ) -> Self {
        Self {
            access,
            directory,
            provisioning,
        }
    }
}
