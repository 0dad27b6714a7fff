//! Schema synchronization, run once at startup after the pool exists.
//!
//! Every statement is `IF NOT EXISTS`-guarded; existing data is never
//! touched. The DDL differs per engine (serial column syntax, inline vs.
//! standalone index creation), so each entity carries one statement set per
//! adapter.

use super::{Adapter, Db, DbError};

const USERS_POSTGRES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT,
        given_name TEXT NOT NULL,
        family_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_users_deleted_at ON users (deleted_at)",
];

// MySQL has no CREATE INDEX IF NOT EXISTS, so indexes are declared inline.
const USERS_MYSQL: &[&str] = &[r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        created_at VARCHAR(64) NOT NULL,
        updated_at VARCHAR(64) NOT NULL,
        deleted_at VARCHAR(64),
        given_name VARCHAR(255) NOT NULL,
        family_name VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL UNIQUE,
        INDEX idx_users_deleted_at (deleted_at)
    )
    "#];

const TODOS_POSTGRES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS todos (
        id BIGSERIAL PRIMARY KEY,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT,
        user_id BIGINT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT FALSE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_todos_user_id ON todos (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_todos_deleted_at ON todos (deleted_at)",
];

const TODOS_MYSQL: &[&str] = &[r#"
    CREATE TABLE IF NOT EXISTS todos (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        created_at VARCHAR(64) NOT NULL,
        updated_at VARCHAR(64) NOT NULL,
        deleted_at VARCHAR(64),
        user_id BIGINT NOT NULL,
        title VARCHAR(255) NOT NULL,
        description TEXT NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        INDEX idx_todos_user_id (user_id),
        INDEX idx_todos_deleted_at (deleted_at)
    )
    "#];

/// Bring the physical schema up to date with the two entity definitions.
pub async fn run(db: &Db) -> Result<(), DbError> {
    let (users, todos) = match db.adapter() {
        Adapter::Postgres => (USERS_POSTGRES, TODOS_POSTGRES),
        Adapter::MySql => (USERS_MYSQL, TODOS_MYSQL),
    };

    sync_entity(db, "users", users).await?;
    sync_entity(db, "todos", todos).await?;
    tracing::debug!("successfully executed database migrations");
    Ok(())
}

async fn sync_entity(db: &Db, entity: &'static str, statements: &[&str]) -> Result<(), DbError> {
    for statement in statements {
        sqlx::query(statement)
            .execute(db.pool())
            .await
            .map_err(|source| DbError::Schema { entity, source })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddl_is_guarded_and_engine_specific() {
        for statement in USERS_POSTGRES.iter().chain(TODOS_POSTGRES) {
            assert!(statement.contains("IF NOT EXISTS"));
        }
        assert!(USERS_POSTGRES[0].contains("BIGSERIAL"));
        assert!(USERS_MYSQL[0].contains("AUTO_INCREMENT"));
        // MySQL path must not rely on CREATE INDEX IF NOT EXISTS
        for statement in USERS_MYSQL.iter().chain(TODOS_MYSQL) {
            assert!(!statement.trim_start().starts_with("CREATE INDEX"));
        }
    }

    #[test]
    fn email_uniqueness_is_a_storage_constraint() {
        assert!(USERS_POSTGRES[0].contains("email TEXT NOT NULL UNIQUE"));
        assert!(USERS_MYSQL[0].contains("email VARCHAR(255) NOT NULL UNIQUE"));
    }
}
