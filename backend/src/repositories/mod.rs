//! Data access layer
//!
//! Accounts are relational rows; everything else a user tracks lives in
//! their profile document.

pub mod profile;
pub mod user;

pub use profile::{
    InMemoryProfileStore, PgProfileStore, ProfileStore, ProfileUpdate, StoreError,
    VersionedDocument,
};
pub use user::{UserRecord, UserRepository};
