//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Thin adapters only: these types translate between Diesel row structs and
//! domain profile types. Row structs and the schema definition are internal
//! to this module and never cross into the domain layer. Connections come
//! from a `bb8` pool over `diesel-async`.

mod diesel_profile_repository;
mod models;
pub mod pool;
pub(crate) mod schema;

pub use diesel_profile_repository::DieselProfileRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
