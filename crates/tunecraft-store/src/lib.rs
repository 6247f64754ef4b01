//! Session storage and credit ledger for tunecraft.
//!
//! Session state lives behind the [`SessionStore`] trait so the ledger can be
//! handed any backend. The only backend shipped is [`MemoryStore`]; sessions
//! do not outlive the process.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tunecraft_core::{CreditPolicy, SessionId};
//! use tunecraft_store::{Ledger, MemoryStore};
//!
//! let ledger = Ledger::new(Arc::new(MemoryStore::new()), CreditPolicy::default());
//! let session = SessionId::generate();
//!
//! assert_eq!(ledger.balance(&session).unwrap(), 3);
//! assert_eq!(ledger.charge(&session).unwrap(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ledger;
pub mod memory;

pub use error::{LedgerError, Result, StoreError};
pub use ledger::Ledger;
pub use memory::MemoryStore;

use tunecraft_core::{SessionId, SessionRecord};

/// Key-value storage for per-session state, keyed by [`SessionId`].
///
/// Implementations need not serialize read-modify-write sequences; callers
/// that read then write the same session may race.
pub trait SessionStore: Send + Sync {
    /// Get a session record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get(&self, session: &SessionId) -> Result<Option<SessionRecord>>;

    /// Insert or replace a session record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn put(&self, session: &SessionId, record: &SessionRecord) -> Result<()>;
}
