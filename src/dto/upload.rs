//! DTO definitions for media uploads.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Response returned after a successful upload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Public URL of the stored object.
    pub url: String,
    /// Object key inside the bucket.
    pub key: String,
}

/// Payload removing a previously uploaded object.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUploadRequest {
    #[validate(length(min = 1, max = 512))]
    pub key: String,
}
