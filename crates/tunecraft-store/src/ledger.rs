//! Per-session credit ledger.
//!
//! Every operation reads the session record, computes the new balance and
//! writes it back. There is no lock around that sequence, so two concurrent
//! requests on the same session can lose an update.

use std::sync::Arc;

use tunecraft_core::{CreditPolicy, SessionId, SessionRecord};

use crate::error::LedgerError;
use crate::SessionStore;

/// Credit ledger over an injected [`SessionStore`].
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn SessionStore>,
    policy: CreditPolicy,
}

impl Ledger {
    /// Create a ledger.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, policy: CreditPolicy) -> Self {
        Self { store, policy }
    }

    /// The amounts this ledger applies.
    #[must_use]
    pub const fn policy(&self) -> &CreditPolicy {
        &self.policy
    }

    /// Current balance, initializing the session if it has no record.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Store` if the store fails.
    pub fn balance(&self, session: &SessionId) -> Result<u64, LedgerError> {
        Ok(self.load(session)?.credits)
    }

    /// Add the reward amount and return the new balance.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Store` if the store fails.
    pub fn reward(&self, session: &SessionId) -> Result<u64, LedgerError> {
        let mut record = self.load(session)?;
        let balance = record.credits.saturating_add(self.policy.reward_amount);
        record.set_credits(balance);
        self.store.put(session, &record)?;

        tracing::info!(
            session = %session,
            amount = self.policy.reward_amount,
            balance,
            "Credits rewarded"
        );

        Ok(balance)
    }

    /// Check that the session can pay for one generation without deducting.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InsufficientCredits` if the balance is below the cost.
    /// - `LedgerError::Store` if the store fails.
    pub fn ensure_funds(&self, session: &SessionId) -> Result<u64, LedgerError> {
        let balance = self.balance(session)?;
        if balance < self.policy.cost_per_generation {
            return Err(LedgerError::InsufficientCredits {
                balance,
                required: self.policy.cost_per_generation,
            });
        }
        Ok(balance)
    }

    /// Deduct the cost of one generation and return the new balance.
    ///
    /// The balance is left untouched on failure.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InsufficientCredits` if the balance is below the cost.
    /// - `LedgerError::Store` if the store fails.
    pub fn charge(&self, session: &SessionId) -> Result<u64, LedgerError> {
        let mut record = self.load(session)?;
        let required = self.policy.cost_per_generation;
        let balance = record
            .credits
            .checked_sub(required)
            .ok_or(LedgerError::InsufficientCredits {
                balance: record.credits,
                required,
            })?;

        record.set_credits(balance);
        self.store.put(session, &record)?;

        tracing::info!(session = %session, cost = required, balance, "Credits charged");

        Ok(balance)
    }

    fn load(&self, session: &SessionId) -> Result<SessionRecord, LedgerError> {
        if let Some(record) = self.store.get(session)? {
            return Ok(record);
        }

        let record = SessionRecord::new(self.policy.initial_credits);
        self.store.put(session, &record)?;
        tracing::debug!(
            session = %session,
            credits = record.credits,
            "Session initialized"
        );
        Ok(record)
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
