use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AppError {
    #[error("Not signed in")]
    Unauthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict, retry: {0}")]
    ConflictRetryable(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Retries exhausted: {0}")]
    ExhaustedRetries(String),

    #[error("Rate limited for {0}s")]
    RateLimited(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FromStr for AppError {
    type Err = std::convert::Infallible;

    /// Recovers the variant from a `Display` string, which is how errors travel back
    /// through server functions.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s
            .strip_prefix("error running server function: ")
            .unwrap_or(s);
        let tail = |prefix: &str| s[prefix.len()..].to_string();

        if s.starts_with("Not signed in") {
            Ok(AppError::Unauthenticated)
        } else if s.starts_with("Not found: ") {
            Ok(AppError::NotFound(tail("Not found: ")))
        } else if s.starts_with("Invalid input: ") {
            Ok(AppError::InvalidInput(tail("Invalid input: ")))
        } else if s.starts_with("Conflict, retry: ") {
            Ok(AppError::ConflictRetryable(tail("Conflict, retry: ")))
        } else if s.starts_with("Storage unavailable: ") {
            Ok(AppError::StorageUnavailable(tail("Storage unavailable: ")))
        } else if s.starts_with("Retries exhausted: ") {
            Ok(AppError::ExhaustedRetries(tail("Retries exhausted: ")))
        } else if let Some(secs) = s
            .strip_prefix("Rate limited for ")
            .and_then(|rest| rest.strip_suffix('s'))
            .and_then(|n| n.parse().ok())
        {
            Ok(AppError::RateLimited(secs))
        } else {
            Ok(AppError::Internal(s.to_string()))
        }
    }
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    /// Transient failures the caller may retry without changing its request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConflictRetryable(_) | Self::StorageUnavailable(_))
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Please sign in with your university account first.".to_string(),
            Self::NotFound(what) => not_found_message(what).to_string(),
            Self::InvalidInput(reason) => reason.clone(),
            Self::ConflictRetryable(_) => "Someone beat you to it. Please try again.".to_string(),
            Self::StorageUnavailable(_) => "We're having trouble reaching the database. Try again soon.".to_string(),
            Self::ExhaustedRetries(_) => "Couldn't finish that request. Please try again.".to_string(),
            Self::RateLimited(secs) => format!("Slow down! Try again in {} seconds.", secs),
            Self::Internal(_) => "Something went wrong on our side.".to_string(),
        }
    }
}

/// Names the missing thing when the payload says what it was.
fn not_found_message(what: &str) -> &'static str {
    let what = what.trim_start().to_ascii_lowercase();
    if what.starts_with("launch") {
        "That launch doesn't exist anymore."
    } else if what.starts_with("forum post") {
        "That post doesn't exist anymore."
    } else if what.contains("comment") {
        "That comment doesn't exist anymore."
    } else if what.starts_with("student") {
        "We couldn't find that student."
    } else {
        "We couldn't find what you were looking for."
    }
}

#[cfg(feature = "ssr")]
mod ssr_impl {
    use super::AppError;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;

    #[derive(serde::Serialize)]
    struct ErrorResponse {
        message: String,
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = match &self {
                AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
                AppError::NotFound(_) => StatusCode::NOT_FOUND,
                AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                AppError::ConflictRetryable(_) => StatusCode::CONFLICT,
                AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                AppError::ExhaustedRetries(_) | AppError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (
                status,
                Json(ErrorResponse {
                    message: self.user_message(),
                }),
            )
                .into_response()
        }
    }
}


#[cfg(all(test, feature = "ssr"))]
mod ssr_tests {
    use super::*;
    use server_fn::ServerFnError;

    fn server_fn_body(err: AppError) -> Result<(), ServerFnError> {
        let result: Result<(), AppError> = Err(err);
        result?;
        Ok(())
    }

    #[test]
    fn test_variant_survives_server_fn_error() {
        let errors = [
            AppError::Unauthenticated,
            AppError::RateLimited(30),
            AppError::not_found("parent comment"),
        ];
        for err in errors {
            let wire = server_fn_body(err.clone()).unwrap_err();
            assert!(matches!(wire, ServerFnError::ServerError(_)));
            assert_eq!(AppError::from_str(&wire.to_string()).unwrap(), err);
        }
    }
}
