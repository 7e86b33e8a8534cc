//! Dashboard errors and the JSON response envelope

use chrono::Utc;
use league_analytics::AnalyticsError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use warp::http::StatusCode;
use yahoo_fetcher::FetchError;

/// Where an unauthenticated client should go to sign in
pub const LOGIN_PATH: &str = "/login";

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Yahoo API returned {status} for {url}")]
    Upstream { status: u16, url: String, body: String },

    #[error("Yahoo API unreachable: {message}")]
    Transport { message: String },

    #[error("League data is inconsistent: {0}")]
    DataConsistency(#[from] AnalyticsError),

    #[error("Team '{team}' not found")]
    TeamNotFound { team: String },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<FetchError> for DashboardError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NotAuthenticated => DashboardError::NotAuthenticated,
            FetchError::Upstream { status, url, body } => DashboardError::Upstream { status, url, body },
            FetchError::Http(e) => DashboardError::Transport { message: e.to_string() },
            FetchError::OAuth { message } => DashboardError::Transport { message },
            FetchError::Decode(e) => DashboardError::DataConsistency(e),
            FetchError::InvalidConfig { message } => DashboardError::Internal { message },
        }
    }
}

impl DashboardError {
    pub fn status(&self) -> StatusCode {
        match self {
            DashboardError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            DashboardError::Upstream { .. } | DashboardError::Transport { .. } => StatusCode::BAD_GATEWAY,
            DashboardError::DataConsistency(_) | DashboardError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            DashboardError::TeamNotFound { .. } => StatusCode::NOT_FOUND,
            DashboardError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DashboardError::NotAuthenticated => "NOT_AUTHENTICATED",
            DashboardError::Upstream { .. } | DashboardError::Transport { .. } => "UPSTREAM_ERROR",
            DashboardError::DataConsistency(_) => "DATA_CONSISTENCY",
            DashboardError::TeamNotFound { .. } => "TEAM_NOT_FOUND",
            DashboardError::BadRequest { .. } => "BAD_REQUEST",
            DashboardError::Internal { .. } => "INTERNAL",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            DashboardError::NotAuthenticated => Some(json!({ "login_url": LOGIN_PATH })),
            DashboardError::Upstream { status, url, body } => {
                Some(json!({ "status": status, "url": url, "body": FetchError::body_excerpt(body) }))
            }
            DashboardError::TeamNotFound { team } => Some(json!({ "team": team })),
            _ => None,
        }
    }

    pub fn to_detail(&self) -> ErrorDetail {
        ErrorDetail { code: self.code().to_string(), message: self.to_string(), details: self.details() }
    }
}

/// Error detail
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

/// `{success, data | error, timestamp}` envelope for every API response
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
    pub timestamp: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None, timestamp: Utc::now().to_rfc3339() }
    }
}

impl ApiResponse<()> {
    pub fn failure(err: &DashboardError) -> Self {
        Self { success: false, data: None, error: Some(err.to_detail()), timestamp: Utc::now().to_rfc3339() }
    }
}
