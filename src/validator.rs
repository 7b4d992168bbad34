use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use gatehouse_core::AppError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use validator::{Validate, ValidationErrors};

/// Message for every request body that fails to parse or validate.
pub const INVALID_INPUT_MESSAGE: &str = "Invalid input data";

/// `{"field": ["message", ...]}` for each failing field.
fn field_details(errors: &ValidationErrors) -> Value {
    let fields: Map<String, Value> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
                .map(Value::String)
                .collect();
            (field.to_string(), Value::Array(messages))
        })
        .collect();
    Value::Object(fields)
}

fn rejection_detail(rejection: &JsonRejection) -> String {
    let error_msg = rejection.body_text();

    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return "Missing 'Content-Type: application/json' header".to_string();
    }

    if let Some(field) = error_msg
        .split("missing field `")
        .nth(1)
        .and_then(|s| s.split('`').next())
    {
        return format!("{} is required", field);
    }

    if error_msg.contains("invalid type") {
        return "Invalid field type in request".to_string();
    }

    "Invalid request body".to_string()
}

/// JSON body extractor that also runs `validator` rules. Every failure is a
/// 400 with per-field details.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::validation(
                    INVALID_INPUT_MESSAGE,
                    json!({ "body": [rejection_detail(&rejection)] }),
                )
            })?;

        value
            .validate()
            .map_err(|errors| AppError::validation(INVALID_INPUT_MESSAGE, field_details(&errors)))?;

        Ok(ValidatedJson(value))
    }
}
