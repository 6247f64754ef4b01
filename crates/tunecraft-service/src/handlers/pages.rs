//! Landing page.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;

use crate::error::ApiError;
use crate::session::CurrentSession;
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Serve the landing page, initializing the session balance on first visit.
pub async fn index(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<Html<&'static str>, ApiError> {
    state.ledger.balance(&session)?;
    Ok(Html(INDEX_HTML))
}
