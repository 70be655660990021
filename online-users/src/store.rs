use crate::record::{ErrorInfo, QueryResult};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, error, warn};

/// Row filter understood by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq { column: String, value: String },
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Query-string pair in PostgREST form, e.g. `("status", "eq.ONLINE")`.
    pub fn to_query_pair(&self) -> (String, String) {
        match self {
            Filter::Eq { column, value } => (column.clone(), format!("eq.{}", value)),
        }
    }
}

/// PostgREST `select` value for every column.
pub const ALL_COLUMNS: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub table: String,
    /// Sent as-is in `select=`.
    pub columns: String,
    pub filter: Filter,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid request url for table '{table}': {reason}")]
    InvalidUrl { table: String, reason: String },
}

/// Read access to a hosted record store.
///
/// Failures reported by the store, including an unreachable store, come back
/// inside the envelope. `Err` is reserved for queries that cannot be issued.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn select(&self, query: &SelectQuery) -> Result<QueryResult<Vec<Value>>, StoreError>;
}

/// PostgREST client for a Supabase style project.
pub struct RestStore {
    client: Client,
    base: Url,
    secret_key: String,
}

impl RestStore {
    pub fn new(client: Client, url: &str, secret_key: impl Into<String>) -> anyhow::Result<Self> {
        let mut base =
            Url::parse(url).map_err(|e| anyhow::anyhow!("Invalid store URL '{}': {}", url, e))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client,
            base,
            secret_key: secret_key.into(),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        self.base
            .join("rest/v1/")
            .and_then(|u| u.join(table))
            .map_err(|e| StoreError::InvalidUrl {
                table: table.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn select(&self, query: &SelectQuery) -> Result<QueryResult<Vec<Value>>, StoreError> {
        let url = self.table_url(&query.table)?;
        let (filter_key, filter_value) = query.filter.to_query_pair();
        debug!(
            "Selecting from '{}' with {}={} (select={})",
            query.table, filter_key, filter_value, query.columns
        );

        let resp = self
            .client
            .get(url)
            .query(&[("select", query.columns.as_str()), (filter_key.as_str(), filter_value.as_str())])
            .header("apikey", &self.secret_key)
            .bearer_auth(&self.secret_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await;

        let resp = match resp {
            Ok(r) => r,
            Err(e) => {
                error!("Store request for '{}' failed: {}", query.table, e);
                return Ok(QueryResult::err(ErrorInfo::message(format!("FetchError: {}", e))));
            }
        };

        let status = resp.status();
        let body = match resp.bytes().await {
            Ok(b) => b,
            Err(e) => {
                error!("Failed to read store response body: {}", e);
                return Ok(QueryResult::err(ErrorInfo::message(format!("FetchError: {}", e))));
            }
        };

        if status.is_success() {
            Ok(decode_rows(&body))
        } else {
            warn!("Store answered {} for '{}'", status, query.table);
            Ok(QueryResult::err(decode_error(status, &body)))
        }
    }
}

fn decode_rows(body: &Bytes) -> QueryResult<Vec<Value>> {
    match serde_json::from_slice::<Vec<Value>>(body) {
        Ok(rows) => QueryResult::ok(rows),
        Err(e) => QueryResult::err(ErrorInfo::message(format!(
            "failed to decode store response: {}",
            e
        ))),
    }
}

fn decode_error(status: StatusCode, body: &Bytes) -> ErrorInfo {
    if let Ok(info) = serde_json::from_slice::<ErrorInfo>(body) {
        return info;
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    let message = if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("store request failed")
            .to_string()
    } else {
        text
    };
    ErrorInfo::message(message).with_code(status.as_u16().to_string())
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{extract::Query, http::HeaderMap, routing::get, Json, Router};
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    pub(crate) struct Seen {
        pub query: HashMap<String, String>,
        pub apikey: Option<String>,
        pub authorization: Option<String>,
    }

    /// Serves `GET /rest/v1/users` with a fixed status and JSON body and
    /// records every request it sees.
    pub(crate) async fn spawn_mock_store(
        status: axum::http::StatusCode,
        body: Value,
    ) -> (String, Arc<Mutex<Vec<Seen>>>) {
        let seen: Arc<Mutex<Vec<Seen>>> = Arc::new(Mutex::new(Vec::new()));
        let rec = seen.clone();

        let app = Router::new().route(
            "/rest/v1/users",
            get(
                move |Query(query): Query<HashMap<String, String>>, headers: HeaderMap| {
                    let rec = rec.clone();
                    let body = body.clone();
                    async move {
                        let header = |name: &str| {
                            headers
                                .get(name)
                                .and_then(|v| v.to_str().ok())
                                .map(|s| s.to_string())
                        };
                        rec.lock().unwrap().push(Seen {
                            query,
                            apikey: header("apikey"),
                            authorization: header("authorization"),
                        });
                        (status, Json(body))
                    }
                },
            ),
        );

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        let server = axum::Server::from_tcp(listener)
            .expect("server")
            .serve(app.into_make_service());
        tokio::spawn(server);
        (format!("http://127.0.0.1:{}", addr.port()), seen)
    }
}
