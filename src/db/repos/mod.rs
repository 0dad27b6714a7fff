//! Repository implementations for database access.
//!
//! Each repository borrows the shared [`crate::Db`] handle, holds one SQL
//! string per query (`?` placeholders, adapted per engine by `Db::sql`), and
//! uses JOINs for eager loads instead of per-row follow-up queries.

pub mod todos;
pub mod users;

pub use todos::{Todo, TodoRepo};
pub use users::{User, UserRepo};
