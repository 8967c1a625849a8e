//! HTTP handlers for accounts, the menu catalog, and orders.

pub mod auth;
pub mod menu;
pub mod orders;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;

/// Decode a JSON body into a typed request; a shape mismatch is a validation
/// failure in the standard envelope, not a transport-level rejection.
fn parse_body<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::Validation(format!("invalid request body: {}", e)))
}

/// Unwrap the body extractor. A body that never parsed as JSON gets the same
/// validation envelope as one with the wrong shape.
fn parse_json<T: DeserializeOwned>(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<T, ApiError> {
    let Json(value) =
        body.map_err(|e| ApiError::Validation(format!("invalid request body: {}", e)))?;
    parse_body(value)
}

fn not_found(id: impl std::fmt::Display) -> ApiError {
    ApiError::NotFound(format!("resource not found with an id of {}", id))
}

/// Malformed ids behave like absent resources.
fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| not_found(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_ids_parse() {
        let id = "0c9130e9-7760-41c8-a7fa-5915f7016d29";
        assert_eq!(parse_id(id).unwrap().to_string(), id);
    }

    #[test]
    fn malformed_ids_read_as_missing_resources() {
        assert!(matches!(parse_id("42"), Err(ApiError::NotFound(_))));
        assert!(matches!(parse_id(""), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn body_shape_errors_are_validation_failures() {
        #[derive(Debug, serde::Deserialize)]
        struct Payload {
            #[allow(dead_code)]
            name: String,
        }
        let err = parse_body::<Payload>(serde_json::json!({"name": 7})).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
