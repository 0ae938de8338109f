//! OpenAI-specific error handling.

use picpost_core::Error;

use super::types::OpenAIErrorResponse;

/// OpenAI-specific error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAIErrorCode {
    /// Invalid authentication credentials.
    AuthenticationError,
    /// Rate limit exceeded.
    RateLimitExceeded,
    /// Model not found or not available.
    ModelNotFound,
    /// Image could not be decoded by the provider.
    InvalidImage,
    /// Server error.
    ServerError,
    /// Unknown error.
    Unknown,
}

impl OpenAIErrorCode {
    /// Determine error code from HTTP status and error code/type.
    pub fn from_response(status: u16, code: &str) -> Self {
        match (status, code) {
            (401, _) => Self::AuthenticationError,
            (429, _) => Self::RateLimitExceeded,
            (404, _) | (_, "model_not_found") => Self::ModelNotFound,
            (400, _) if code.contains("image") => Self::InvalidImage,
            (500..=599, _) => Self::ServerError,
            _ => Self::Unknown,
        }
    }
}

/// Which call failed; selects the core error variant for generic failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Embedding,
    Vision,
}

/// Convert an OpenAI failure into a core [`Error`].
pub fn to_core_error(code: OpenAIErrorCode, op: Operation, message: &str) -> Error {
    let generic = |msg: String| match op {
        Operation::Embedding => Error::Embedding(msg),
        Operation::Vision => Error::Inference(msg),
    };
    match code {
        OpenAIErrorCode::AuthenticationError => {
            Error::Config(format!("Authentication failed: {}", message))
        }
        OpenAIErrorCode::ModelNotFound => Error::Config(format!("Model not found: {}", message)),
        OpenAIErrorCode::RateLimitExceeded => generic(format!("Rate limit exceeded: {}", message)),
        OpenAIErrorCode::InvalidImage => Error::InvalidInput(format!("Invalid image: {}", message)),
        OpenAIErrorCode::ServerError => generic(format!("Server error: {}", message)),
        OpenAIErrorCode::Unknown => generic(message.to_string()),
    }
}

/// Build an error from a non-success HTTP status and its raw body.
pub fn from_http_failure(status: u16, body: &str, op: Operation) -> Error {
    match serde_json::from_str::<OpenAIErrorResponse>(body) {
        Ok(parsed) => {
            let code = parsed
                .error
                .code
                .as_deref()
                .unwrap_or(parsed.error.error_type.as_str());
            to_core_error(
                OpenAIErrorCode::from_response(status, code),
                op,
                &format!("OpenAI returned {}: {}", status, parsed.error.message),
            )
        }
        Err(_) => to_core_error(
            OpenAIErrorCode::from_response(status, ""),
            op,
            &format!("OpenAI returned {}: {}", status, body.trim()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_from_401() {
        let code = OpenAIErrorCode::from_response(401, "invalid_api_key");
        assert_eq!(code, OpenAIErrorCode::AuthenticationError);
    }

    #[test]
    fn test_error_code_from_429() {
        let code = OpenAIErrorCode::from_response(429, "rate_limit_exceeded");
        assert_eq!(code, OpenAIErrorCode::RateLimitExceeded);
    }

    #[test]
    fn test_error_code_invalid_image() {
        let code = OpenAIErrorCode::from_response(400, "invalid_image_format");
        assert_eq!(code, OpenAIErrorCode::InvalidImage);
    }

    #[test]
    fn test_error_code_from_502() {
        let code = OpenAIErrorCode::from_response(502, "bad_gateway");
        assert_eq!(code, OpenAIErrorCode::ServerError);
    }

    #[test]
    fn test_error_code_from_unknown() {
        let code = OpenAIErrorCode::from_response(418, "im_a_teapot");
        assert_eq!(code, OpenAIErrorCode::Unknown);
    }

    #[test]
    fn test_auth_failure_is_config_error() {
        let err = to_core_error(OpenAIErrorCode::AuthenticationError, Operation::Vision, "bad key");
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_generic_failure_follows_operation() {
        let err = to_core_error(OpenAIErrorCode::ServerError, Operation::Embedding, "boom");
        assert!(matches!(err, Error::Embedding(_)));
        let err = to_core_error(OpenAIErrorCode::ServerError, Operation::Vision, "boom");
        assert!(matches!(err, Error::Inference(_)));
    }

    #[test]
    fn test_from_http_failure_parses_json_body() {
        let body = r#"{"error":{"message":"Incorrect API key","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        let err = from_http_failure(401, body, Operation::Embedding);
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("Incorrect API key"));
    }

    #[test]
    fn test_from_http_failure_plain_text_body() {
        let err = from_http_failure(503, "upstream unavailable\n", Operation::Vision);
        assert!(matches!(err, Error::Inference(_)));
        assert!(err.to_string().contains("upstream unavailable"));
    }
}
