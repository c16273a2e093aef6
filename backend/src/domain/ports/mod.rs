//! Domain ports: traits the core depends on and the operations it exposes.

pub(crate) mod macros;

mod access_control;
mod identity_provider;
mod profile_repository;
mod user_directory_query;
mod user_provisioning_command;

pub use access_control::{AccessControl, StaffContext};
pub use identity_provider::{
    Identity, IdentityProvider, IdentityProviderError, InMemoryIdentityProvider,
};
pub use profile_repository::{
    InMemoryProfileRepository, ProfilePersistenceError, ProfileRepository,
};
pub use user_directory_query::UserDirectoryQuery;
pub use user_provisioning_command::{CreateUser, UserProvisioningCommand};
