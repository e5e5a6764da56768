//! Persistence transaction facility for the attest subsystem
//!
//! Provides the session-scoped atomic read/write layer both components
//! build on: snapshot reads, optimistic versioned commits with a
//! uniqueness constraint on the identity key, append-only ledger inserts,
//! and verified retention pruning. The isolation story lives entirely
//! here — the registry and ledger crates hold no locks of their own.

mod retry;
mod store;

pub use retry::{RetryBudget, DEFAULT_COMMIT_ATTEMPTS};
pub use store::{CommitError, RegistryStore, Versioned};
