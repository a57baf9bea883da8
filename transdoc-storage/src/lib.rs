//! Persistence collaborator traits and the in-memory reference store.
//!
//! The dispatcher never touches storage directly; it goes through one
//! capability per entity ([`EntityOps`]) plus the authentication store
//! ([`AuthStore`]). The traits promise per-Id mutual exclusion for
//! mutations, provided here through versioned records and
//! compare-and-swap updates: of two conflicting concurrent writers,
//! exactly one wins and the other gets a clean [`StorageError::Conflict`].
//!
//! The in-memory implementation ([`MemTable`], [`MemAuthStore`],
//! [`MemDirectory`]) is the reference collaborator used by tests and local
//! runs; production deployments substitute their own impls of the traits.

mod auth;
mod directory;
mod error;
mod ops;
mod table;

pub use auth::{AuthStore, MemAuthStore};
pub use directory::MemDirectory;
pub use error::{StorageError, StorageResult};
pub use ops::{EntityOps, StoredEntity, VersionedRecord};
pub use table::MemTable;
