//! Avatar and question media uploads to S3-compatible object storage.

use aws_config::{BehaviorVersion, defaults};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    Client,
    config::{Builder as S3ConfigBuilder, Region},
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use uuid::Uuid;

use crate::{config::S3Settings, dto::upload::UploadResponse, error::ServiceError, state::SharedState};

/// Content types accepted for uploads.
const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "audio/mpeg",
    "audio/ogg",
];

/// Uploads are refused above this size.
const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// S3 client bound to one bucket.
#[derive(Clone)]
pub struct ObjectStorage {
    client: Client,
    bucket: String,
    endpoint: String,
}

impl ObjectStorage {
    /// Build the client from validated settings; static credentials,
    /// path-style addressing for MinIO-style endpoints.
    pub async fn new(settings: &S3Settings) -> Self {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(Credentials::new(
                settings.access_key.clone(),
                settings.secret_key.clone(),
                None,
                None,
                "static",
            ))
            .endpoint_url(&settings.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&settings.endpoint)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(conf),
            bucket: settings.bucket.clone(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{key}", self.endpoint, self.bucket)
    }
}

/// Store one uploaded object under a fresh uuid-derived key.
pub async fn put_object(
    state: &SharedState,
    file_name: &str,
    content_type: &str,
    body: Bytes,
) -> Result<UploadResponse, ServiceError> {
    if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
        return Err(ServiceError::InvalidInput(format!(
            "unsupported content type `{content_type}`"
        )));
    }
    if body.is_empty() {
        return Err(ServiceError::InvalidInput("empty upload".into()));
    }
    if body.len() > MAX_UPLOAD_BYTES {
        return Err(ServiceError::InvalidInput(format!(
            "upload exceeds {MAX_UPLOAD_BYTES} bytes"
        )));
    }

    let storage = state
        .object_storage()
        .await
        .ok_or(ServiceError::Degraded)?;
    let key = object_key(file_name);

    storage
        .client
        .put_object()
        .bucket(&storage.bucket)
        .key(&key)
        .body(ByteStream::from(body))
        .content_type(content_type)
        .send()
        .await
        .map_err(|err| ServiceError::Internal(format!("s3 put_object failed: {err}")))?;

    Ok(UploadResponse {
        url: storage.public_url(&key),
        key,
    })
}

/// Remove a previously uploaded object.
pub async fn delete_object(state: &SharedState, key: &str) -> Result<(), ServiceError> {
    if key.trim().is_empty() || key.contains("..") {
        return Err(ServiceError::InvalidInput("invalid object key".into()));
    }

    let storage = state
        .object_storage()
        .await
        .ok_or(ServiceError::Degraded)?;
    storage
        .client
        .delete_object()
        .bucket(&storage.bucket)
        .key(key)
        .send()
        .await
        .map_err(|err| ServiceError::Internal(format!("s3 delete_object failed: {err}")))?;
    Ok(())
}

fn object_key(file_name: &str) -> String {
    // Only the extension of the client-supplied name survives.
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default();
    format!("uploads/{}{extension}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_keeps_only_a_safe_extension() {
        let key = object_key("../../etc/passwd.PNG");
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with(".png"));
        assert!(!key.contains(".."));

        let no_ext = object_key("weird.na/me");
        assert!(!no_ext.contains('.'));
    }
}
