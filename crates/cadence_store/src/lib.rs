//! Repository seams for the Cadence marketing-ops core.
//!
//! Persistence is delegated to an external row-oriented data store; this
//! crate defines the traits the domain services speak through, an in-memory
//! implementation used by tests, and the bounded-retry wrapper applied to
//! simple CRUD writes.

#![warn(missing_docs)]

mod memory;
mod retry;
mod traits;

pub use memory::InMemoryStore;
pub use retry::with_write_retry;
pub use traits::{
    ApprovalStore, ContentStore, EntitlementChecker, InteractionStore, OauthStateStore,
    ProfileStore, SocialAccountStore, TeamStore, TrackedPostStore,
};
