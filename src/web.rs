//! HTTP endpoints for the console: session minting and refresh, the session
//! permissions response, and access checks against the caller's grant map.

use crate::access::evaluator::{has_access_to_resource, has_permission};
use crate::access::loader::PolicyCatalog;
use crate::access::types::{
    AuthorizeRequest, AuthorizeResponse, NewSessionRequest, PoliciesResponse, SessionResponse,
};
use crate::errors::BreakwaterError;
use crate::session::{SessionCookie, SessionSnapshot, SessionStore};
use crate::settings::Settings;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use miette::IntoDiagnostic;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub policies: Arc<PolicyCatalog>,
    pub sessions: SessionStore,
}

// Security headers middleware
async fn security_headers(request: Request<Body>, next: Next) -> impl IntoResponse {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    // X-Frame-Options: Prevent clickjacking
    headers.insert(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );

    // X-Content-Type-Options: Prevent MIME sniffing
    headers.insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );

    // Content-Security-Policy: JSON API only, nothing should load resources
    headers.insert(
        HeaderName::from_static("content-security-policy"),
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );

    // Referrer-Policy: Control referrer information
    headers.insert(
        HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    response
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/api/v1/policies", get(list_policies))
        .route(
            "/api/v1/session",
            post(create_session)
                .get(session_check)
                .put(refresh_session)
                .delete(logout),
        )
        .route("/api/v1/authorize", post(authorize))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

pub async fn serve(settings: Settings, policies: PolicyCatalog) -> miette::Result<()> {
    let sessions = SessionStore::new();

    // Background cleanup of expired sessions
    let _scheduler = crate::jobs::init_scheduler(sessions.clone())
        .await
        .map_err(|e| miette::miette!("failed to start job scheduler: {e}"))?;

    let state = AppState {
        settings: Arc::new(settings),
        policies: Arc::new(policies),
        sessions,
    };

    let addr: SocketAddr = format!(
        "{}:{}",
        state.settings.server.host, state.settings.server.port
    )
    .parse()
    .map_err(|e| miette::miette!("bad listen addr: {e}"))?;

    let app = router(state);

    tracing::info!(%addr, "Console access API listening");
    let listener = tokio::net::TcpListener::bind(addr).await.into_diagnostic()?;
    axum::serve(listener, app).await.into_diagnostic()?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn list_policies(State(state): State<AppState>) -> Json<PoliciesResponse> {
    Json(PoliciesResponse {
        policies: state.policies.names(),
    })
}

/// Mint a session from a list of policy names and return its grant map plus
/// a session cookie.
async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<NewSessionRequest>,
) -> Result<Response, BreakwaterError> {
    let snapshot = build_snapshot(&state, &req.policies)?;
    let response = session_response(&snapshot);
    let session_id = state.sessions.create(snapshot);

    let cookie = SessionCookie::new(session_id);
    let headers = [(
        axum::http::header::SET_COOKIE,
        cookie.to_cookie_header(&state.settings),
    )];
    Ok((StatusCode::CREATED, headers, Json(response)).into_response())
}

/// The session permissions response the console renders from.
async fn session_check(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, BreakwaterError> {
    let snapshot = current_session(&state, &headers)?;
    Ok(Json(session_response(&snapshot)))
}

/// Recompile the caller's policies and swap in a fresh snapshot.
async fn refresh_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, BreakwaterError> {
    let cookie = SessionCookie::from_headers(&headers).ok_or(BreakwaterError::InvalidSession)?;
    let current = state
        .sessions
        .get(&cookie.session_id)
        .ok_or(BreakwaterError::InvalidSession)?;

    let snapshot = build_snapshot(&state, &current.policies)?;
    let response = session_response(&snapshot);
    if !state.sessions.replace(&cookie.session_id, snapshot) {
        return Err(BreakwaterError::InvalidSession);
    }
    Ok(Json(response))
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(cookie) = SessionCookie::from_headers(&headers) {
        state.sessions.remove(&cookie.session_id);
    }
    let headers = [(
        axum::http::header::SET_COOKIE,
        SessionCookie::delete_cookie_header(),
    )];
    (StatusCode::NO_CONTENT, headers).into_response()
}

/// Evaluate an access check against the caller's session snapshot.
async fn authorize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AuthorizeRequest>,
) -> Result<Json<AuthorizeResponse>, BreakwaterError> {
    let snapshot = current_session(&state, &headers)?;

    let allowed = match &req.granted {
        Some(granted) => has_access_to_resource(Some(granted.as_slice()), &req.scopes, req.match_all),
        None => has_permission(
            &snapshot.grants,
            req.resources.as_ref(),
            &req.scopes,
            req.match_all,
            req.contains_resource,
        ),
    };

    Ok(Json(AuthorizeResponse { allowed }))
}

fn current_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Arc<SessionSnapshot>, BreakwaterError> {
    let cookie = SessionCookie::from_headers(headers).ok_or(BreakwaterError::InvalidSession)?;
    state
        .sessions
        .get(&cookie.session_id)
        .ok_or(BreakwaterError::InvalidSession)
}

fn build_snapshot(state: &AppState, policies: &[String]) -> Result<SessionSnapshot, BreakwaterError> {
    let compiled = state.policies.compile(policies)?;
    Ok(SessionSnapshot {
        grants: compiled.grants,
        allow_resources: compiled.allow_resources,
        policies: policies.to_vec(),
        expires_at: Utc::now().timestamp() + state.settings.session.ttl_secs,
    })
}

fn session_response(snapshot: &SessionSnapshot) -> SessionResponse {
    SessionResponse {
        status: "ok".to_string(),
        permissions: snapshot.grants.to_sorted(),
        allow_resources: snapshot.allow_resources.clone(),
        policies: snapshot.policies.clone(),
        expires_at: snapshot.expires_at,
    }
}
