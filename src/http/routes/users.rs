//! User endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::repos::{Todo, TodoRepo, User, UserRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;

use super::parse_id;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(rename = "givenName")]
    pub given_name: String,
    #[serde(rename = "familyName")]
    pub family_name: String,
    pub email: String,
}

/// GET /users - all users with their todos eagerly loaded.
async fn list_users(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let users = UserRepo::new(&state.db)
        .list_with_todos()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "no user could be found");
            ApiError::NotFound("No user could be found".to_string())
        })?;
    Ok(Json(json!({ "data": users })))
}

/// GET /users/{id}
async fn get_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&raw_id, "User")?;
    let user = UserRepo::new(&state.db).get_with_todos(id).await?;
    Ok(Json(json!({ "data": user })))
}

/// GET /users/{id}/todos - every todo owned by the user.
async fn get_user_todos(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let id = parse_id(&raw_id, "User")?;
    let todos = TodoRepo::new(&state.db).list_for_user(id).await.map_err(|e| {
        tracing::error!(user_id = id, error = %e, "couldn't get user todos");
        ApiError::Database(format!("couldn't get todo items for user {id}"))
    })?;
    Ok(Json(todos))
}

/// POST /users - create a user after an email uniqueness pre-check.
async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(req) = payload
        .map_err(|e| ApiError::Validation(format!("couldn't parse input {e}")))?;

    let repo = UserRepo::new(&state.db);
    let existing = repo.find_by_email(&req.email).await.map_err(|e| {
        tracing::error!(error = %e, "couldn't fetch users from db");
        ApiError::Database(format!("couldn't fetch users from db {e}"))
    })?;
    if existing.is_some() {
        return Err(ApiError::Conflict(format!(
            "User with email {} already exists",
            req.email
        )));
    }

    let user = repo
        .create(&req.given_name, &req.family_name, &req.email)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "couldn't create user");
            ApiError::Database("couldn't create user".to_string())
        })?;
    Ok(Json(user))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/todos", get(get_user_todos))
}
