//! Image uploads to the public storage bucket.

use camino::Utf8Path;
use chrono::Utc;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::ServiceClient;
use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};

/// Bucket settings sent on create and update.
#[derive(Debug, Serialize)]
struct BucketOptions<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    public: bool,
    file_size_limit: usize,
    allowed_mime_types: &'a [String],
}

#[derive(Debug, Deserialize)]
struct Bucket {
    name: String,
}

/// MIME type for an image file extension.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Check that `file_name` and `size` fit the bucket rules.
///
/// Returns the file's extension and MIME type.
pub fn validate<'a>(
    file_name: &'a str,
    size: usize,
    config: &StorageConfig,
) -> StorageResult<(&'a str, &'static str)> {
    let ext = Utf8Path::new(file_name)
        .extension()
        .ok_or_else(|| StorageError::UnsupportedType(file_name.to_string()))?;
    let mime = mime_for_extension(ext)
        .filter(|mime| config.allowed_mime_types.iter().any(|allowed| allowed == mime))
        .ok_or_else(|| StorageError::UnsupportedType(ext.to_string()))?;

    if size > config.max_upload_bytes {
        return Err(StorageError::TooLarge {
            size,
            limit: config.max_upload_bytes,
        });
    }
    Ok((ext, mime))
}

/// Unique object name: `{unix-millis}-{random}.{ext}`.
pub fn object_name(ext: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}.{}",
        Utc::now().timestamp_millis(),
        &random[..12],
        ext.to_ascii_lowercase()
    )
}

/// Public URL of an object.
pub fn public_url(base: &str, bucket: &str, object: &str) -> String {
    format!("{base}/storage/v1/object/public/{bucket}/{object}")
}

/// The public image bucket.
#[derive(Debug, Clone)]
pub struct ImageStore {
    service: ServiceClient,
    config: StorageConfig,
}

impl ImageStore {
    /// Bucket access over `service`.
    pub const fn new(service: ServiceClient, config: StorageConfig) -> Self {
        Self { service, config }
    }

    /// Create the bucket if missing, then make sure it is public with the
    /// configured limits. Safe to call repeatedly.
    #[tracing::instrument(skip(self), fields(bucket = %self.config.bucket))]
    pub async fn ensure_bucket(&self) -> StorageResult<()> {
        let buckets: Vec<Bucket> =
            ServiceClient::send(self.service.request(Method::GET, "storage/v1/bucket"))
                .await?
                .json()
                .await
                .map_err(crate::error::BackendError::from)?;

        let bucket = self.config.bucket.as_str();
        if !buckets.iter().any(|b| b.name == bucket) {
            tracing::info!("creating bucket");
            let options = self.options(Some(bucket));
            ServiceClient::send(
                self.service
                    .request(Method::POST, "storage/v1/bucket")
                    .json(&options),
            )
            .await?;
        }

        let options = self.options(None);
        ServiceClient::send(
            self.service
                .request(Method::PUT, &format!("storage/v1/bucket/{bucket}"))
                .json(&options),
        )
        .await?;
        Ok(())
    }

    fn options<'a>(&'a self, create: Option<&'a str>) -> BucketOptions<'a> {
        BucketOptions {
            id: create,
            name: create,
            public: true,
            file_size_limit: self.config.max_upload_bytes,
            allowed_mime_types: &self.config.allowed_mime_types,
        }
    }

    /// Upload image bytes and return the object's public URL.
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> StorageResult<String> {
        let (ext, mime) = validate(file_name, bytes.len(), &self.config)?;
        let object = object_name(ext);
        let bucket = &self.config.bucket;

        ServiceClient::send(
            self.service
                .request(Method::POST, &format!("storage/v1/object/{bucket}/{object}"))
                .header("content-type", mime)
                .header("cache-control", "max-age=3600")
                .header("x-upsert", "false")
                .body(bytes),
        )
        .await?;

        let url = public_url(self.service.base(), bucket, &object);
        tracing::info!(%url, "image uploaded");
        Ok(url)
    }

    /// Read a local file and upload it.
    pub async fn upload_file(&self, path: &Utf8Path) -> StorageResult<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| StorageError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path.file_name().unwrap_or(path.as_str());
        self.upload(file_name, bytes).await
    }
}
