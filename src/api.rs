//! HTTP surface for the user registry.
//!
//! - `GET /users` – List every stored user in insertion order.
//! - `POST /users` – Store an arbitrary JSON object under a freshly assigned `id` (201).
//! - `PUT /users/:user_id` – Shallow-merge the body into an existing user; 404 when unknown.
//! - `DELETE /users/:user_id` – Remove the user if present; always answers 200.
//!
//! Every route answers with JSON and permits cross-origin requests from any origin.

use crate::store::{StoreError, User, UserApi, UserFields, UserId};
use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Body returned by `DELETE /users/:user_id`.
pub const DELETED_MESSAGE: &str = "User deleted";

/// Build the HTTP router exposing the user registry.
pub fn create_router<S>(store: Arc<S>) -> Router
where
    S: UserApi + 'static,
{
    Router::new()
        .route("/users", get(list_users::<S>).post(create_user::<S>))
        .route(
            "/users/:user_id",
            put(update_user::<S>).delete(delete_user::<S>),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

/// Return the whole collection.
async fn list_users<S>(State(store): State<Arc<S>>) -> Json<Vec<User>>
where
    S: UserApi,
{
    Json(store.list_users().await)
}

/// Store the posted object and echo it back with its assigned id.
async fn create_user<S>(
    State(store): State<Arc<S>>,
    payload: Result<Json<UserFields>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError>
where
    S: UserApi,
{
    let Json(fields) = payload?;
    let user = store.create_user(fields).await;
    tracing::info!(user_id = user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Merge the posted object into the addressed user.
async fn update_user<S>(
    State(store): State<Arc<S>>,
    user_id: Result<Path<UserId>, PathRejection>,
    payload: Result<Json<UserFields>, JsonRejection>,
) -> Result<Json<User>, AppError>
where
    S: UserApi,
{
    let Path(user_id) = user_id?;
    let Json(patch) = payload?;
    let user = store.update_user(user_id, patch).await?;
    tracing::info!(user_id, "User updated");
    Ok(Json(user))
}

/// Remove the addressed user. Unknown ids are not an error.
async fn delete_user<S>(
    State(store): State<Arc<S>>,
    user_id: Result<Path<UserId>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError>
where
    S: UserApi,
{
    let Path(user_id) = user_id?;
    let removed = store.delete_user(user_id).await;
    tracing::info!(user_id, removed, "User delete handled");
    Ok(Json(MessageResponse {
        message: DELETED_MESSAGE,
    }))
}

/// Response body for successful deletes.
#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

/// Response body for every failure.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

enum AppError {
    Store(StoreError),
    Rejected { status: StatusCode, message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Store(err @ StoreError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            AppError::Rejected { status, message } => (status, message),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(inner: StoreError) -> Self {
        Self::Store(inner)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(%rejection, "Rejected request body");
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(%rejection, "Rejected path parameter");
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}
