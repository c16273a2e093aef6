//! Identity provider adapter speaking the GoTrue-style HTTP API.

mod dto;
mod http_provider;

pub use http_provider::{HttpIdentityProvider, IdentityProviderSettings, IdentitySetupError};
