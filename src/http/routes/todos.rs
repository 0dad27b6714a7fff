//! Todo endpoints.
//!
//! `completed` moves one way: pending -> completed via markAsCompleted, with
//! no reverse transition. The update targets only that column, so repeating
//! the call is harmless.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::repos::{Todo, TodoRepo, UserRepo};
use crate::db::DbError;
use crate::http::error::ApiError;
use crate::http::server::AppState;

use super::parse_id;

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(rename = "userID")]
    pub user_id: i64,
    pub title: String,
    pub description: String,
}

/// GET /todo - all non-deleted todos.
async fn list_todos(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let todos = TodoRepo::new(&state.db).list().await.map_err(|e| {
        tracing::error!(error = %e, "no todo item could be found");
        ApiError::NotFound("No todo item could be found".to_string())
    })?;
    Ok(Json(json!({ "data": todos })))
}

/// GET /todo/{id}
async fn get_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&raw_id, "Todo")?;
    let todo = TodoRepo::new(&state.db).get(id).await?;
    Ok(Json(json!({ "data": todo })))
}

/// POST /todo - create a todo for an existing user.
async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Json(req) = payload
        .map_err(|e| ApiError::Validation(format!("couldn't parse input {e}")))?;

    // strict existence check: a zero-row lookup is a rejection, not a pass
    let user_exists = UserRepo::new(&state.db).exists(req.user_id).await?;
    if !user_exists {
        return Err(ApiError::Validation(
            "can't create a todo for a user that doesn't exist".to_string(),
        ));
    }

    let todo = TodoRepo::new(&state.db)
        .create(req.user_id, &req.title, &req.description)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "couldn't create todo item");
            ApiError::Database("couldn't create todo item".to_string())
        })?;
    Ok(Json(todo))
}

/// PATCH /todo/{id}/markAsCompleted
async fn mark_todo_as_completed(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&raw_id, "Todo")?;
    let repo = TodoRepo::new(&state.db);
    let mut todo = repo.get(id).await?;

    // the row can be deleted between the fetch and the update; that is a
    // missing todo, not a database failure
    let updated_at = repo.mark_completed(id).await.map_err(|e| match e {
        DbError::NotFound { .. } => ApiError::from(e),
        other => {
            tracing::error!(id, error = %other, "failed to mark todo item as completed");
            ApiError::Database(format!(
                "Todo item with id {id} couldn't be marked as completed"
            ))
        }
    })?;

    todo.completed = true;
    todo.updated_at = updated_at;
    Ok(Json(json!({ "data": todo })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/todo", get(list_todos).post(create_todo))
        .route("/todo/{id}", get(get_todo))
        .route("/todo/{id}/markAsCompleted", patch(mark_todo_as_completed))
}
