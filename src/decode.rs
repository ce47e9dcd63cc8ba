//! Status-driven decoding of control-plane responses.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, DiskError, Result};

/// A decoded API response.
#[derive(Debug, PartialEq)]
pub enum Decoded<T> {
    /// 204: nothing to decode.
    NoContent,
    /// Status >= 400 with the error payload and the status attached.
    Failure(ApiError),
    /// Any other status, body decoded as `T`.
    Success(T),
}

impl<T: DeserializeOwned> Decoded<T> {
    /// Decode a fully read body according to `status`.
    ///
    /// Invalid JSON in either the error or the success branch is reported as
    /// [`DiskError::Decoding`], never swallowed.
    pub fn from_body(status: StatusCode, body: &[u8]) -> Result<Self> {
        if status == StatusCode::NO_CONTENT {
            return Ok(Decoded::NoContent);
        }

        if status.as_u16() >= 400 {
            let mut error: ApiError = serde_json::from_slice(body).map_err(DiskError::Decoding)?;
            error.status_code = status.as_u16();
            return Ok(Decoded::Failure(error));
        }

        let value = serde_json::from_slice(body).map_err(DiskError::Decoding)?;
        Ok(Decoded::Success(value))
    }

    /// Read and decode a response. The body is not read for 204.
    pub async fn from_response(response: Response) -> Result<Self> {
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Decoded::NoContent);
        }

        let body = response.bytes().await?;
        Self::from_body(status, &body)
    }
}

impl<T> Decoded<T> {
    /// Turn a decoded failure into `Err`, keeping `NoContent` as `None`.
    pub fn into_result(self) -> Result<Option<T>> {
        match self {
            Decoded::NoContent => Ok(None),
            Decoded::Failure(error) => {
                tracing::warn!(
                    status = error.status_code,
                    error = %error.error_id,
                    "API request failed: {}",
                    error.description
                );
                Err(DiskError::Api(error))
            }
            Decoded::Success(value) => Ok(Some(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Link;

    #[test]
    fn test_no_content_ignores_body() {
        let decoded = Decoded::<Link>::from_body(StatusCode::NO_CONTENT, b"not json").unwrap();
        assert_eq!(decoded, Decoded::NoContent);
        assert!(decoded.into_result().unwrap().is_none());
    }

    #[test]
    fn test_error_status_attaches_code() {
        let body = br#"{"message":"m","description":"Too many requests","error":"TooManyRequestsError"}"#;
        let decoded = Decoded::<Link>::from_body(StatusCode::TOO_MANY_REQUESTS, body).unwrap();

        match decoded {
            Decoded::Failure(err) => {
                assert_eq!(err.status_code, 429);
                assert_eq!(err.error_id, "TooManyRequestsError");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_error_status_with_invalid_body() {
        let result = Decoded::<Link>::from_body(StatusCode::TOO_MANY_REQUESTS, b"invalid json");
        assert!(matches!(result, Err(DiskError::Decoding(_))));
    }

    #[test]
    fn test_success_with_invalid_body() {
        let result = Decoded::<Link>::from_body(StatusCode::OK, b"invalid json");
        assert!(matches!(result, Err(DiskError::Decoding(_))));
    }

    #[test]
    fn test_success_with_wrong_shape() {
        let result = Decoded::<Link>::from_body(StatusCode::CREATED, br#"{"href": 1}"#);
        assert!(matches!(result, Err(DiskError::Decoding(_))));
    }

    #[test]
    fn test_success() {
        let body = br#"{"href":"https://example.com","method":"GET","templated":false}"#;
        let decoded = Decoded::<Link>::from_body(StatusCode::CREATED, body).unwrap();
        let link = decoded.into_result().unwrap().unwrap();
        assert_eq!(link.href, "https://example.com");
        assert_eq!(link.method, "GET");
    }

    #[test]
    fn test_failure_into_result() {
        let err = Decoded::<Link>::Failure(ApiError {
            status_code: 404,
            ..ApiError::default()
        })
        .into_result()
        .unwrap_err();

        assert_eq!(err.api_error().map(|e| e.status_code), Some(404));
    }
}
