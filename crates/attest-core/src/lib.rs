//! Shared domain types for the attest subsystem
//!
//! This crate defines the data model shared by the status registry and
//! the action ledger:
//!
//! - **Identity**: the external key both components index by
//! - **StatusRecord**: one lifecycle record per identity, moving through
//!   the review workflow
//! - **LedgerEntry**: immutable cipher-action events
//! - **AttestError**: the operation error taxonomy and its wire envelope
//!
//! No I/O happens here; persistence lives in `attest-store` and the
//! operations live in `attest-registry` / `attest-ledger`.

mod clock;
mod entry;
mod envelope;
mod error;
mod identity;
mod record;
mod status;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CipherAction, EntryId, LedgerEntry};
pub use envelope::ResultEnvelope;
pub use error::{AttestError, Result};
pub use identity::Identity;
pub use record::{AttachmentKind, AttachmentRef, ContactInfo, GeoContext, StatusRecord};
pub use status::{Decision, VerificationStatus};
