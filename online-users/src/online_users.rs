use crate::config::ErrorStatus;
use crate::record::UserStatus;
use crate::state::AppState;
use crate::store::{Filter, SelectQuery, ALL_COLUMNS};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const USERS_TABLE: &str = "users";
pub const STATUS_COLUMN: &str = "status";

/// `SELECT * FROM users WHERE status = 'ONLINE'`
pub fn online_users_query() -> SelectQuery {
    SelectQuery {
        table: USERS_TABLE.to_string(),
        columns: ALL_COLUMNS.to_string(),
        filter: Filter::eq(STATUS_COLUMN, UserStatus::Online.as_str()),
    }
}

/// Returns the store's `{ data, error }` envelope for all online users.
///
/// The request itself is never inspected. Envelope errors are answered with
/// 200 unless the `mapped` policy is configured; a query that cannot be issued
/// at all yields a bare 500.
pub async fn online_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    debug!("Received online users request");

    let query = online_users_query();
    let raw = match state.store.select(&query).await {
        Ok(r) => r,
        Err(e) => {
            error!("Store query failed: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    let envelope = raw.into_user_records();

    let status = match (&envelope.error, state.error_status) {
        (Some(err), ErrorStatus::Mapped) => {
            warn!("Store returned error (code {:?}): {}", err.code(), err.message);
            StatusCode::BAD_GATEWAY
        }
        (Some(err), ErrorStatus::Passthrough) => {
            warn!(
                "Store returned error (code {:?}), answering 200: {}",
                err.code(),
                err.message
            );
            StatusCode::OK
        }
        (None, _) => {
            info!(
                "Returning {} online user(s)",
                envelope.data.as_ref().map_or(0, Vec::len)
            );
            StatusCode::OK
        }
    };

    Ok((status, Json(envelope)).into_response())
}
