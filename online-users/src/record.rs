use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    Online,
    Offline,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Online => "ONLINE",
            UserStatus::Offline => "OFFLINE",
        }
    }
}

/// A row of the `users` table. Only `status` is typed; every other column is
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub status: UserStatus,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Error object as reported by the store. Only `message` is typed; `code`,
/// `details`, `hint` and anything else the store sends are kept verbatim,
/// explicit `null`s included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub message: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ErrorInfo {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extra: Map::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.extra
            .insert("code".to_string(), Value::String(code.into()));
        self
    }

    pub fn code(&self) -> Option<&str> {
        self.extra.get("code").and_then(Value::as_str)
    }
}

/// The `{ data, error }` envelope a store query resolves to. Both keys are
/// always serialized, as `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult<T> {
    pub data: Option<T>,
    pub error: Option<ErrorInfo>,
}

impl<T> QueryResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: ErrorInfo) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }
}

impl QueryResult<Vec<Value>> {
    /// Decodes raw rows into `UserRecord`s. A row that does not fit turns the
    /// whole envelope into an error; an existing error is kept as is.
    pub fn into_user_records(self) -> QueryResult<Vec<UserRecord>> {
        let QueryResult { data, error } = self;
        let data = match data {
            Some(rows) => rows,
            None => return QueryResult { data: None, error },
        };
        let decoded: Result<Vec<UserRecord>, _> =
            data.into_iter().map(serde_json::from_value).collect();
        match decoded {
            Ok(records) => QueryResult {
                data: Some(records),
                error,
            },
            Err(e) => QueryResult::err(ErrorInfo::message(format!("invalid user record: {}", e))),
        }
    }
}
