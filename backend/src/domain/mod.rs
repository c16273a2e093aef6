//! Transport-agnostic core: profile types, access control, listing
//! semantics, the administration service, and the ports they depend on.

pub mod access;
pub mod admin;
pub mod credentials;
mod error;
pub mod listing;
pub mod ports;
pub mod profile;

pub use access::{AccessControlService, Capability, ensure_permitted, extract_bearer_token};
pub use admin::UserAdminService;
pub use credentials::{EmailAddress, PASSWORD_MIN_LEN, Password};
pub use error::{Error, ErrorCode};
pub use listing::{ProfileListing, ProfilePage, ProfileSort, SortColumn, SortDirection};
pub use profile::{
    DeleteMode, LanguagePreference, NewProfile, Profile, ProfileChanges, Role, SubjectId,
};
