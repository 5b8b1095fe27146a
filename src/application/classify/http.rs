use serde_json::Value;

use super::labels::status_label;
use crate::domain::{
    ErrorCategory, ErrorClassification, ErrorDescription, HttpException, PublicMessage,
};

/// Pass an application-raised exception through with its own status.
/// The message is always normalized to a list.
pub fn classify(exception: &HttpException) -> ErrorClassification {
    let status = exception.status();

    ErrorClassification {
        category: ErrorCategory::Http,
        subcode: None,
        status,
        message: PublicMessage::List(messages(exception)),
        label: status_label(status),
    }
}

fn messages(exception: &HttpException) -> Vec<String> {
    let described = match exception.response() {
        ErrorDescription::Body(Value::Object(body)) => body.get("message"),
        _ => None,
    };

    match described {
        Some(Value::String(message)) => vec![message.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(message) => message.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(other) if !other.is_null() => vec![other.to_string()],
        _ => vec![exception.message().to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_scalar_message_becomes_list() {
        let result = classify(&HttpException::not_found("Return not found"));

        assert_eq!(result.status, StatusCode::NOT_FOUND);
        assert_eq!(result.label, "Not Found");
        assert_eq!(
            result.message,
            PublicMessage::List(vec!["Return not found".to_string()])
        );
    }

    #[test]
    fn test_message_array_passes_through_in_order() {
        let messages = vec![
            "ssn must be 9 digits".to_string(),
            "email must be an email".to_string(),
            "taxYear must not be in the future".to_string(),
        ];

        let result = classify(&HttpException::unprocessable(messages.clone()));

        assert_eq!(result.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(result.label, "Unprocessable Entity");
        assert_eq!(result.message, PublicMessage::List(messages));
    }

    #[test]
    fn test_body_without_message_uses_exception_message() {
        let exception = HttpException::new(StatusCode::UNAUTHORIZED, json!({ "hint": "login" }));

        let result = classify(&exception);

        assert_eq!(
            result.message,
            PublicMessage::List(vec!["Unauthorized".to_string()])
        );
    }

    #[test]
    fn test_status_is_not_remapped() {
        let result = classify(&HttpException::new(
            StatusCode::TOO_MANY_REQUESTS,
            "Slow down",
        ));

        assert_eq!(result.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(result.label, "Error");
    }

    #[test]
    fn test_non_string_array_items_are_rendered() {
        let exception = HttpException::new(
            StatusCode::BAD_REQUEST,
            json!({ "message": ["first", 2, { "field": "w2" }] }),
        );

        let result = classify(&exception);

        assert_eq!(
            result.message,
            PublicMessage::List(vec![
                "first".to_string(),
                "2".to_string(),
                "{\"field\":\"w2\"}".to_string(),
            ])
        );
    }
}
