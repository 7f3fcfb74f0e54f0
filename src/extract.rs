use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// JSON body extractor whose rejection is a `VALIDATION_ERROR` naming the
/// offending field.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        if bytes.is_empty() {
            return Err(AppError::bad_request("request body is required"));
        }

        let de = &mut serde_json::Deserializer::from_slice(&bytes);
        serde_path_to_error::deserialize(de).map(ValidJson).map_err(|err| {
            let path = err.path().to_string();
            if path == "." {
                AppError::bad_request(format!("invalid JSON body: {}", err.inner()))
            } else {
                AppError::bad_request(format!("invalid value at `{path}`: {}", err.inner()))
            }
        })
    }
}
