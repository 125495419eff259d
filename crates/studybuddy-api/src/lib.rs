pub mod auth;
pub mod error;
pub mod matches;
pub mod middleware;
pub mod options;
pub mod otp;
pub mod students;
pub mod validation;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tracing::error;

use crate::auth::AppState;
use crate::error::ApiError;

/// All routes, with the JWT guard applied to the protected ones.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(options::index))
        .route("/health", get(options::health))
        .route("/options", get(options::get_options))
        .route("/options/departments/{college}", get(options::get_departments))
        .route("/otp/send", post(otp::send_otp))
        .route("/otp/verify", post(otp::verify_otp))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/me", get(auth::me))
        .route("/me/profile", put(students::update_profile))
        .route("/students", get(students::list_students))
        .route("/students/{student_id}", get(students::get_student))
        .route("/matches/{student_id}", get(matches::get_matches))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Run blocking DB work off the async runtime.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(anyhow::anyhow!("background task failed"))
    })?
}
