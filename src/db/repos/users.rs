//! User repository.
//!
//! List and get load todos eagerly through a single LEFT JOIN, so the
//! handlers never issue per-user follow-up queries.

use serde::Serialize;
use sqlx::any::AnyRow;
use sqlx::Row;

use crate::db::repos::Todo;
use crate::db::{now_rfc3339, Adapter, Db, DbError};

/// User record with eagerly loaded todos.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "CreatedAt")]
    pub created_at: String,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: String,
    #[serde(rename = "DeletedAt")]
    pub deleted_at: Option<String>,
    #[serde(rename = "givenName")]
    pub given_name: String,
    #[serde(rename = "familyName")]
    pub family_name: String,
    pub email: String,
    pub todos: Vec<Todo>,
}

// Users joined with their non-deleted todos; rows are grouped by user id so
// fold_joined_rows can collect each user's todos in one pass.
const SELECT_WITH_TODOS: &str = "SELECT u.id, u.created_at, u.updated_at, u.deleted_at, \
     u.given_name, u.family_name, u.email, \
     t.id AS todo_id, t.created_at AS todo_created_at, t.updated_at AS todo_updated_at, \
     t.deleted_at AS todo_deleted_at, t.title, t.description, t.completed \
     FROM users u \
     LEFT JOIN todos t ON t.user_id = u.id AND t.deleted_at IS NULL \
     WHERE u.deleted_at IS NULL";

fn user_from_joined_row(row: &AnyRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
        given_name: row.try_get("given_name")?,
        family_name: row.try_get("family_name")?,
        email: row.try_get("email")?,
        todos: Vec::new(),
    })
}

fn fold_joined_rows(rows: &[AnyRow]) -> Result<Vec<User>, sqlx::Error> {
    let mut users: Vec<User> = Vec::new();
    for row in rows {
        let user_id: i64 = row.try_get("id")?;
        if users.last().map(|u| u.id) != Some(user_id) {
            users.push(user_from_joined_row(row)?);
        }
        // LEFT JOIN leaves the todo columns NULL for todo-less users
        let todo_id: Option<i64> = row.try_get("todo_id")?;
        if let (Some(todo_id), Some(user)) = (todo_id, users.last_mut()) {
            user.todos.push(Todo {
                id: todo_id,
                created_at: row.try_get("todo_created_at")?,
                updated_at: row.try_get("todo_updated_at")?,
                deleted_at: row.try_get("todo_deleted_at")?,
                user_id,
                title: row.try_get("title")?,
                description: row.try_get("description")?,
                completed: row.try_get("completed")?,
            });
        }
    }
    Ok(users)
}

pub struct UserRepo<'a> {
    db: &'a Db,
}

impl<'a> UserRepo<'a> {
    pub fn new(db: &'a Db) -> Self {
        Self { db }
    }

    /// All non-deleted users with their todos.
    pub async fn list_with_todos(&self) -> Result<Vec<User>, DbError> {
        let sql = format!("{SELECT_WITH_TODOS} ORDER BY u.id, t.id");
        let rows = sqlx::query(&sql).fetch_all(self.db.pool()).await?;
        Ok(fold_joined_rows(&rows)?)
    }

    /// One non-deleted user, with todos.
    pub async fn get_with_todos(&self, id: i64) -> Result<User, DbError> {
        let sql = format!("{SELECT_WITH_TODOS} AND u.id = ? ORDER BY t.id");
        let sql = self.db.sql(&sql);
        let rows = sqlx::query(&sql)
            .bind(id)
            .fetch_all(self.db.pool())
            .await?;
        fold_joined_rows(&rows)?
            .into_iter()
            .next()
            .ok_or(DbError::NotFound {
                resource: "User",
                id,
            })
    }

    /// Look up a non-deleted user by email. `Ok(None)` means zero rows, which
    /// is not an error here.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let sql = self.db.sql(
            "SELECT id, created_at, updated_at, deleted_at, given_name, family_name, email \
             FROM users WHERE email = ? AND deleted_at IS NULL",
        );
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;
        match row {
            Some(row) => Ok(Some(user_from_joined_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Whether a non-deleted user with this id exists.
    pub async fn exists(&self, id: i64) -> Result<bool, DbError> {
        let sql = self
            .db
            .sql("SELECT id FROM users WHERE id = ? AND deleted_at IS NULL");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    /// Insert a new user. The UNIQUE constraint on email backs the caller's
    /// pre-check, so a racing duplicate still fails here.
    pub async fn create(
        &self,
        given_name: &str,
        family_name: &str,
        email: &str,
    ) -> Result<User, DbError> {
        let now = now_rfc3339();
        let id = match self.db.adapter() {
            Adapter::Postgres => {
                let row = sqlx::query(
                    "INSERT INTO users (created_at, updated_at, given_name, family_name, email) \
                     VALUES ($1, $2, $3, $4, $5) RETURNING id",
                )
                .bind(&now)
                .bind(&now)
                .bind(given_name)
                .bind(family_name)
                .bind(email)
                .fetch_one(self.db.pool())
                .await?;
                row.try_get("id")?
            }
            Adapter::MySql => {
                let result = sqlx::query(
                    "INSERT INTO users (created_at, updated_at, given_name, family_name, email) \
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(&now)
                .bind(&now)
                .bind(given_name)
                .bind(family_name)
                .bind(email)
                .execute(self.db.pool())
                .await?;
                result.last_insert_id().ok_or(DbError::MissingInsertId)?
            }
        };

        Ok(User {
            id,
            created_at: now.clone(),
            updated_at: now,
            deleted_at: None,
            given_name: given_name.to_string(),
            family_name: family_name.to_string(),
            email: email.to_string(),
            todos: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_field_names() {
        let user = User {
            id: 1,
            created_at: "2024-05-01T10:00:00Z".to_string(),
            updated_at: "2024-05-01T10:00:00Z".to_string(),
            deleted_at: None,
            given_name: "Ada".to_string(),
            family_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            todos: Vec::new(),
        };
        let value = serde_json::to_value(user).unwrap();
        assert_eq!(value["ID"], 1);
        assert_eq!(value["givenName"], "Ada");
        assert_eq!(value["familyName"], "Lovelace");
        assert_eq!(value["email"], "ada@example.com");
        assert!(value["todos"].as_array().unwrap().is_empty());
        assert!(value["DeletedAt"].is_null());
    }
}
