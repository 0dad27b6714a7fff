//! todo-api: users/todos CRUD service over PostgreSQL or MySQL.
//!
//! The binary wires configuration -> database adapter -> schema sync ->
//! router -> HTTP listener. Everything request-scoped lives under [`http`],
//! everything storage-scoped under [`db`].

pub mod config;
pub mod db;
pub mod http;
pub mod metrics;

pub use config::Config;
pub use db::Db;
