use crate::auth;
use crate::config::Config;
use crate::db_storage::{ChatStorage, UserStorage};
use crate::errors::AppError;
use crate::models::*;
use crate::planner;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: SqlitePool,
    /// Application configuration.
    pub config: Config,
}

/// Builds the application router. Shared by `main` and the integration
/// tests so both drive the same routes and layers.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/auth/signup", post(signup))
        .route("/api/v1/auth/signin", post(signin))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/generate", post(generate))
        .route("/api/v1/history", get(history))
        // Chat messages are small; cap payloads well below any model limit.
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Resolve the bearer session to its user or fail with 401.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let token = auth::bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    UserStorage::new(state.db.clone())
        .find_session_user(token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid session token".to_string()))
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-travel-api",
            "version": "0.1.0"
        })),
    )
}

/// POST /api/v1/auth/signup
///
/// Creates a user account with a salted password hash.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if !auth::is_valid_username(&body.username) {
        return Err(AppError::BadRequest(
            "Username must be 3-64 characters: letters, digits, '_', '.', '-'".to_string(),
        ));
    }
    if !auth::is_valid_password(&body.password) {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            auth::MIN_PASSWORD_LEN
        )));
    }

    let password_hash = auth::hash_password(&body.password)?;
    let user = UserStorage::new(state.db.clone())
        .create_user(&body.username, &password_hash)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": user.id, "username": user.username })),
    ))
}

/// POST /api/v1/auth/signin
///
/// Verifies credentials and issues a bearer session token.
pub async fn signin(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<SigninResponse>, AppError> {
    let storage = UserStorage::new(state.db.clone());

    let user = storage
        .find_by_username(&body.username)
        .await?
        .filter(|user| auth::verify_password(&body.password, &user.password_hash))
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials.".to_string()))?;

    let session = storage.create_session(&user.id).await?;
    tracing::info!("User signed in: {}", user.username);

    Ok(Json(SigninResponse {
        token: session.token,
        username: user.username,
    }))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let user = authenticate(&state, &headers).await?;

    // authenticate() already proved the token exists
    let token = auth::bearer_token(&headers).unwrap_or_default();
    UserStorage::new(state.db.clone())
        .delete_session(token)
        .await?;

    tracing::info!("User signed out: {}", user.username);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/generate
///
/// The main chat endpoint: runs the planning pipeline for the message and
/// persists exactly one chat record with whatever text resulted -
/// clarification, itinerary, or fallback. Caller errors (401/400) persist
/// nothing.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let user = authenticate(&state, &headers).await?;

    if body.message.trim().is_empty() {
        return Err(AppError::BadRequest("No message provided.".to_string()));
    }

    tracing::info!(
        "POST /generate - user: {}, message: {} chars",
        user.username,
        body.message.len()
    );

    let outcome = planner::plan_trip(&state.config, &body.message).await;

    if !outcome.degradations.is_empty() {
        tracing::warn!(
            "Response for {} includes fallback data: {:?}",
            user.username,
            outcome.degradations
        );
    }

    ChatStorage::new(state.db.clone())
        .record_chat(&user.id, &body.message, &outcome.response)
        .await?;

    Ok(Json(GenerateResponse {
        response: outcome.response,
    }))
}

/// GET /api/v1/history
///
/// The session user's chat records, oldest first.
pub async fn history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ChatRecord>>, AppError> {
    let user = authenticate(&state, &headers).await?;

    let records = ChatStorage::new(state.db.clone())
        .list_for_user(&user.id)
        .await?;

    Ok(Json(records))
}
