//! Session records and credit policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credits granted to a session on first access.
pub const DEFAULT_INITIAL_CREDITS: u64 = 3;

/// Credits consumed by one successful generation.
pub const DEFAULT_COST_PER_GENERATION: u64 = 1;

/// Credits granted by one reward.
pub const DEFAULT_REWARD_AMOUNT: u64 = 5;

/// Amounts governing the credit ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditPolicy {
    /// Balance assigned to a session that has none.
    pub initial_credits: u64,
    /// Deducted per successful generation.
    pub cost_per_generation: u64,
    /// Added per reward.
    pub reward_amount: u64,
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self {
            initial_credits: DEFAULT_INITIAL_CREDITS,
            cost_per_generation: DEFAULT_COST_PER_GENERATION,
            reward_amount: DEFAULT_REWARD_AMOUNT,
        }
    }
}

/// Per-session state held by the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Current credit balance.
    pub credits: u64,

    /// When the session was first seen.
    pub created_at: DateTime<Utc>,

    /// Last time the record was written.
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create a record holding `credits`.
    #[must_use]
    pub fn new(credits: u64) -> Self {
        let now = Utc::now();
        Self {
            credits,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the balance and bump `updated_at`.
    pub fn set_credits(&mut self, credits: u64) {
        self.credits = credits;
        self.updated_at = Utc::now();
    }
}
