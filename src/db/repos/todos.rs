//! Todo repository.

use serde::Serialize;
use sqlx::any::AnyRow;
use sqlx::Row;

use crate::db::{now_rfc3339, Adapter, Db, DbError};

/// Todo record. Serializes with the audit fields the wire format has always
/// carried; the owning user id is internal and never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct Todo {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "CreatedAt")]
    pub created_at: String,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: String,
    #[serde(rename = "DeletedAt")]
    pub deleted_at: Option<String>,
    #[serde(skip)]
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

fn todo_from_row(row: &AnyRow) -> Result<Todo, sqlx::Error> {
    Ok(Todo {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        completed: row.try_get("completed")?,
    })
}

pub struct TodoRepo<'a> {
    db: &'a Db,
}

impl<'a> TodoRepo<'a> {
    pub fn new(db: &'a Db) -> Self {
        Self { db }
    }

    /// All non-deleted todos.
    pub async fn list(&self) -> Result<Vec<Todo>, DbError> {
        let sql = "SELECT id, created_at, updated_at, deleted_at, user_id, title, description, \
                   completed FROM todos WHERE deleted_at IS NULL ORDER BY id";
        let rows = sqlx::query(sql).fetch_all(self.db.pool()).await?;
        rows.iter()
            .map(|row| todo_from_row(row).map_err(DbError::from))
            .collect()
    }

    /// One non-deleted todo by id.
    pub async fn get(&self, id: i64) -> Result<Todo, DbError> {
        let sql = self.db.sql(
            "SELECT id, created_at, updated_at, deleted_at, user_id, title, description, \
             completed FROM todos WHERE id = ? AND deleted_at IS NULL",
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(DbError::NotFound {
                resource: "Todo item",
                id,
            })?;
        Ok(todo_from_row(&row)?)
    }

    /// All non-deleted todos owned by one user.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Todo>, DbError> {
        let sql = self.db.sql(
            "SELECT id, created_at, updated_at, deleted_at, user_id, title, description, \
             completed FROM todos WHERE user_id = ? AND deleted_at IS NULL ORDER BY id",
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?;
        rows.iter()
            .map(|row| todo_from_row(row).map_err(DbError::from))
            .collect()
    }

    /// Insert a new todo; `completed` always starts false.
    pub async fn create(
        &self,
        user_id: i64,
        title: &str,
        description: &str,
    ) -> Result<Todo, DbError> {
        let now = now_rfc3339();
        let id = match self.db.adapter() {
            Adapter::Postgres => {
                let row = sqlx::query(
                    "INSERT INTO todos (created_at, updated_at, user_id, title, description, \
                     completed) VALUES ($1, $2, $3, $4, $5, FALSE) RETURNING id",
                )
                .bind(&now)
                .bind(&now)
                .bind(user_id)
                .bind(title)
                .bind(description)
                .fetch_one(self.db.pool())
                .await?;
                row.try_get("id")?
            }
            Adapter::MySql => {
                let result = sqlx::query(
                    "INSERT INTO todos (created_at, updated_at, user_id, title, description, \
                     completed) VALUES (?, ?, ?, ?, ?, FALSE)",
                )
                .bind(&now)
                .bind(&now)
                .bind(user_id)
                .bind(title)
                .bind(description)
                .execute(self.db.pool())
                .await?;
                result.last_insert_id().ok_or(DbError::MissingInsertId)?
            }
        };

        Ok(Todo {
            id,
            created_at: now.clone(),
            updated_at: now,
            deleted_at: None,
            user_id,
            title: title.to_string(),
            description: description.to_string(),
            completed: false,
        })
    }

    /// Partial update: only the `completed` column (plus `updated_at`).
    /// Returns the new `updated_at`. Idempotent for already-completed rows;
    /// a row deleted since the caller fetched it surfaces as `NotFound`.
    pub async fn mark_completed(&self, id: i64) -> Result<String, DbError> {
        let now = now_rfc3339();
        let sql = self.db.sql(
            "UPDATE todos SET completed = TRUE, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL",
        );
        let result = sqlx::query(&sql)
            .bind(&now)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "Todo item",
                id,
            });
        }
        Ok(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Todo {
        Todo {
            id: 7,
            created_at: "2024-05-01T10:00:00Z".to_string(),
            updated_at: "2024-05-01T10:00:00Z".to_string(),
            deleted_at: None,
            user_id: 3,
            title: "Buy milk".to_string(),
            description: "2%".to_string(),
            completed: false,
        }
    }

    #[test]
    fn user_id_is_not_serialized() {
        let value = serde_json::to_value(sample()).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("user_id"));
        assert!(!object.contains_key("userID"));
    }

    #[test]
    fn wire_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["ID"], 7);
        assert_eq!(value["title"], "Buy milk");
        assert_eq!(value["description"], "2%");
        assert_eq!(value["completed"], false);
        assert!(value["DeletedAt"].is_null());
        assert_eq!(value["CreatedAt"], "2024-05-01T10:00:00Z");
    }
}
