//! Request handlers, one module per resource. Each exports a `router()`
//! merged under `/api/v1` by [`crate::http::server::build_router`].

pub mod health;
pub mod todos;
pub mod users;

use crate::http::ApiError;

/// Parse a path identifier as a non-negative integer.
///
/// `what` names the entity in the message ("User", "Todo"). Parse failures
/// are client errors across all handlers.
fn parse_id(raw: &str, what: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id >= 0)
        .ok_or_else(|| ApiError::Validation(format!("{what} id must be an integer")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_numeric_and_negative_ids() {
        assert!(parse_id("abc", "User").is_err());
        assert!(parse_id("-1", "Todo").is_err());
        assert!(parse_id("1.5", "Todo").is_err());
        assert_eq!(parse_id("42", "User").unwrap(), 42);
        assert_eq!(parse_id("0", "Todo").unwrap(), 0);
    }

    #[test]
    fn rejects_ids_beyond_i64() {
        // u64::MAX; must not wrap to -1
        assert!(parse_id("18446744073709551615", "Todo").is_err());
        assert!(parse_id("9223372036854775808", "User").is_err());
        assert_eq!(parse_id("9223372036854775807", "User").unwrap(), i64::MAX);
    }
}
