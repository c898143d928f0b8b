use crate::error::ServerResult;
use crate::middleware::TenantId;
use crate::state::ServerState;
use crate::store::StoredMessage;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

const STATS_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyCount {
    /// UTC date, `YYYY-MM-DD`
    pub date: String,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_messages: usize,
    pub messages_per_day: Vec<DailyCount>,
}

/// Per-day message counts sorted by date. Days without messages are omitted.
pub fn count_per_day(messages: &[StoredMessage]) -> Vec<DailyCount> {
    let mut by_date: BTreeMap<String, usize> = BTreeMap::new();
    for message in messages {
        *by_date
            .entry(message.created_at.format("%Y-%m-%d").to_string())
            .or_default() += 1;
    }
    by_date
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

pub async fn get_stats(
    State(state): State<Arc<ServerState>>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
) -> ServerResult<impl IntoResponse> {
    let total_messages = state.store.count_messages(&tenant_id)?;
    let since = Utc::now() - Duration::days(STATS_WINDOW_DAYS);
    let recent = state.store.messages_since(&tenant_id, since)?;

    Ok(Json(StatsResponse {
        total_messages,
        messages_per_day: count_per_day(&recent),
    }))
}
