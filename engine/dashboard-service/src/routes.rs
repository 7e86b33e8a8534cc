//! HTTP routes for the dashboard

use crate::config::SessionConfig;
use crate::error::{ApiResponse, DashboardError};
use crate::render;
use crate::service::DashboardService;
use crate::session::{
    expired_session_cookie, parse_session_cookie, session_cookie, RequestContext, SessionStore, SESSION_COOKIE,
};
use chrono::Duration;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};
use yahoo_fetcher::YahooOAuthClient;

/// Everything the handlers share
pub struct AppState {
    pub service: DashboardService,
    pub sessions: Arc<SessionStore>,
    pub oauth: Arc<YahooOAuthClient>,
    secure_cookies: bool,
    cookie_max_age_secs: u64,
}

impl AppState {
    pub fn new(service: DashboardService, oauth: YahooOAuthClient, session: &SessionConfig) -> Self {
        let secs = i64::try_from(session.max_age_secs).unwrap_or(i64::MAX).min(i64::MAX / 1000);
        let max_age = Duration::seconds(secs);
        Self {
            service,
            sessions: Arc::new(SessionStore::new(max_age)),
            oauth: Arc::new(oauth),
            secure_cookies: session.secure_cookies,
            cookie_max_age_secs: session.max_age_secs,
        }
    }

    fn cookie_for(&self, id: Uuid) -> String {
        session_cookie(id, self.secure_cookies, self.cookie_max_age_secs)
    }

    /// Forget a token the provider no longer accepts
    fn forget_rejected_token(&self, ctx: &RequestContext, err: &DashboardError) {
        if let (DashboardError::NotAuthenticated, Some(id)) = (err, ctx.session_id) {
            self.sessions.clear_token(id);
        }
    }
}

fn json_reply<T: Serialize>(data: T) -> Response {
    warp::reply::with_status(warp::reply::json(&ApiResponse::ok(data)), StatusCode::OK).into_response()
}

fn error_reply(err: &DashboardError) -> Response {
    warp::reply::with_status(warp::reply::json(&ApiResponse::failure(err)), err.status()).into_response()
}

fn redirect(location: &str, cookie: Option<String>) -> Response {
    let reply = warp::reply::with_header(
        warp::reply::with_status(warp::reply::html(String::new()), StatusCode::FOUND),
        "Location",
        location,
    );
    match cookie {
        Some(cookie) => warp::reply::with_header(reply, "Set-Cookie", cookie).into_response(),
        None => reply.into_response(),
    }
}

fn respond<T: Serialize>(state: &AppState, ctx: &RequestContext, result: Result<T, DashboardError>) -> Response {
    match result {
        Ok(data) => json_reply(data),
        Err(e) => {
            state.forget_rejected_token(ctx, &e);
            match &e {
                DashboardError::NotAuthenticated | DashboardError::TeamNotFound { .. } => {
                    warn!("Request failed: {}", e)
                }
                _ => error!("Request failed: {}", e),
            }
            error_reply(&e)
        }
    }
}

/// Create all dashboard routes
pub fn create_routes(state: Arc<AppState>) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let state_filter = warp::any().map(move || state.clone());
    let session_filter = warp::cookie::optional::<String>(SESSION_COOKIE).map(parse_session_cookie);

    let index = warp::path::end()
        .and(warp::get())
        .and(state_filter.clone())
        .and(session_filter.clone())
        .and_then(index_page);

    let login = warp::path("login")
        .and(warp::path::end())
        .and(warp::get())
        .and(state_filter.clone())
        .and(session_filter.clone())
        .and_then(login_redirect);

    let callback = warp::path("callback")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(state_filter.clone())
        .and(session_filter.clone())
        .and_then(oauth_callback);

    let logout = warp::path("logout")
        .and(warp::path::end())
        .and(warp::get())
        .and(state_filter.clone())
        .and(session_filter.clone())
        .and_then(logout_redirect);

    let stats = warp::path!("api" / "stats")
        .and(warp::get())
        .and(state_filter.clone())
        .and(session_filter.clone())
        .and_then(|state: Arc<AppState>, cookie: Option<Uuid>| async move {
            let ctx = state.sessions.context(cookie);
            let result = state.service.season_report(&ctx).await;
            Ok::<_, Rejection>(respond(&state, &ctx, result))
        });

    let teams = warp::path!("api" / "teams")
        .and(warp::get())
        .and(state_filter.clone())
        .and(session_filter.clone())
        .and_then(|state: Arc<AppState>, cookie: Option<Uuid>| async move {
            let ctx = state.sessions.context(cookie);
            let result = state.service.teams(&ctx).await;
            Ok::<_, Rejection>(respond(&state, &ctx, result))
        });

    let wrapped = warp::path!("api" / "wrapped" / String)
        .and(warp::get())
        .and(state_filter.clone())
        .and(session_filter.clone())
        .and_then(|team: String, state: Arc<AppState>, cookie: Option<Uuid>| async move {
            let ctx = state.sessions.context(cookie);
            let result = match urlencoding::decode(&team) {
                Ok(team) => state.service.wrapped(&ctx, &team).await,
                Err(_) => Err(DashboardError::BadRequest { message: "Team name is not valid UTF-8".into() }),
            };
            Ok::<_, Rejection>(respond(&state, &ctx, result))
        });

    let auth_status = warp::path!("api" / "auth" / "status")
        .and(warp::get())
        .and(state_filter.clone())
        .and(session_filter.clone())
        .and_then(|state: Arc<AppState>, cookie: Option<Uuid>| async move {
            let ctx = state.sessions.context(cookie);
            let result = state.service.token_is_valid(&ctx).await;
            if let (Ok(false), Some(id)) = (&result, ctx.session_id) {
                state.sessions.clear_token(id);
            }
            let result = result.map(|authenticated| serde_json::json!({ "authenticated": authenticated }));
            Ok::<_, Rejection>(respond(&state, &ctx, result))
        });

    let health = warp::path("health").and(warp::get()).and(state_filter).map(|state: Arc<AppState>| {
        warp::reply::json(&serde_json::json!({
            "status": "healthy",
            "service": "fantasy-wrapped",
            "sessions": state.sessions.len(),
        }))
    });

    index
        .or(login)
        .or(callback)
        .or(logout)
        .or(stats)
        .or(teams)
        .or(wrapped)
        .or(auth_status)
        .or(health)
        .with(warp::trace::request())
}

async fn index_page(state: Arc<AppState>, cookie: Option<Uuid>) -> Result<Response, Rejection> {
    let ctx = state.sessions.context(cookie);
    if !ctx.is_authenticated() {
        return Ok(warp::reply::html(render::login_page()).into_response());
    }

    match state.service.season_report(&ctx).await {
        Ok(report) => Ok(warp::reply::html(render::dashboard_page(&report)).into_response()),
        Err(DashboardError::NotAuthenticated) => {
            state.forget_rejected_token(&ctx, &DashboardError::NotAuthenticated);
            Ok(warp::reply::html(render::login_page()).into_response())
        }
        Err(e) => {
            error!("Dashboard render failed: {}", e);
            Ok(warp::reply::with_status(warp::reply::html(render::error_page(&e)), e.status()).into_response())
        }
    }
}

async fn login_redirect(state: Arc<AppState>, cookie: Option<Uuid>) -> Result<Response, Rejection> {
    let id = state.sessions.get_or_create(cookie);
    let (url, csrf_state) = state.oauth.authorization_url();
    state.sessions.set_csrf_state(id, csrf_state);

    info!("Redirecting session {} to Yahoo login", id);
    Ok(redirect(&url, Some(state.cookie_for(id))))
}

async fn oauth_callback(
    params: HashMap<String, String>,
    state: Arc<AppState>,
    cookie: Option<Uuid>,
) -> Result<Response, Rejection> {
    let bad_request = |message: &str| -> Result<Response, Rejection> {
        Ok(error_reply(&DashboardError::BadRequest { message: message.to_string() }))
    };

    let Some(id) = cookie else {
        return bad_request("No session; start the login again");
    };
    let Some(code) = params.get("code") else {
        return bad_request("Missing authorization code");
    };

    let expected = state.sessions.take_csrf_state(id);
    match (expected.as_deref(), params.get("state")) {
        (Some(expected), Some(received)) if expected == received => {}
        _ => {
            warn!("OAuth state mismatch for session {}", id);
            return bad_request("OAuth state mismatch");
        }
    }

    match state.oauth.exchange_code(code).await {
        Ok(token) => {
            state.sessions.store_token(id, token);
            info!("Session {} authenticated", id);
            Ok(redirect("/", None))
        }
        Err(e) => {
            error!("OAuth code exchange failed: {}", e);
            Ok(error_reply(&DashboardError::from(e)))
        }
    }
}

async fn logout_redirect(state: Arc<AppState>, cookie: Option<Uuid>) -> Result<Response, Rejection> {
    if let Some(id) = cookie {
        state.sessions.remove(id);
        info!("Session {} logged out", id);
    }
    Ok(redirect("/", Some(expired_session_cookie())))
}
