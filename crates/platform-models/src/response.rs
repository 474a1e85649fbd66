use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Envelope for successful read responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse<T> {
    pub status: String,
    pub message: String,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: "success".to_string(),
            data,
        }
    }
}
