//! Credit balance and reward handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::ApiError;
use crate::session::CurrentSession;
use crate::state::AppState;

/// Balance response.
#[derive(Debug, Serialize)]
pub struct CreditsResponse {
    /// Current balance.
    pub credits: u64,
}

/// Reward response.
#[derive(Debug, Serialize)]
pub struct RewardResponse {
    /// Balance after the reward.
    pub credits: u64,
    /// Human-readable confirmation.
    pub message: String,
}

/// Get the session's credit balance.
pub async fn get_credits(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<CreditsResponse>, ApiError> {
    let credits = state.ledger.balance(&session)?;
    Ok(Json(CreditsResponse { credits }))
}

/// Grant the reward amount.
///
/// Rewards are unconditional; nothing verifies that an ad was watched.
pub async fn reward(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<RewardResponse>, ApiError> {
    let credits = state.ledger.reward(&session)?;
    let amount = state.ledger.policy().reward_amount;

    Ok(Json(RewardResponse {
        credits,
        message: format!("Added {amount} credits!"),
    }))
}
