//! S3-compatible object storage for post HTML.
//!
//! Any S3-compatible endpoint works, including the GCS interoperability
//! endpoint (`https://storage.googleapis.com`) with HMAC keys.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream;

use folio_core::ContentError;
use folio_core::ports::{ContentService, validate_content_key};

/// Object storage location for post content.
#[derive(Debug, Clone)]
pub struct S3ContentConfig {
    pub bucket: String,
    /// Prepended to every key, e.g. `posts/`.
    pub prefix: String,
    pub region: Option<String>,
    /// Custom endpoint for non-AWS stores.
    pub endpoint: Option<String>,
}

impl S3ContentConfig {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: String::new(),
            region: None,
            endpoint: None,
        }
    }

    fn object_key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }
}

/// Content service over an S3 bucket.
pub struct S3ContentService {
    client: Client,
    config: S3ContentConfig,
}

impl S3ContentService {
    /// Build a client from the ambient AWS credentials chain.
    pub async fn new(config: S3ContentConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        tracing::info!(
            bucket = %config.bucket,
            prefix = %config.prefix,
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            "Configured S3 content store"
        );

        Self {
            client: Client::from_conf(builder.build()),
            config,
        }
    }

    pub fn with_client(client: Client, config: S3ContentConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ContentService for S3ContentService {
    async fn get_content(&self, key: &str) -> Result<String, ContentError> {
        validate_content_key(key)?;

        let output = self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(self.config.object_key(key))
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    ContentError::NotFound(key.to_string())
                } else {
                    ContentError::Storage(format!("reading {key}: {e}"))
                }
            })?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| ContentError::Storage(format!("reading {key}: {e}")))?
            .into_bytes();

        String::from_utf8(bytes.to_vec())
            .map_err(|e| ContentError::Storage(format!("{key} is not UTF-8: {e}")))
    }

    async fn save_content(&self, key: &str, html: &str) -> Result<(), ContentError> {
        validate_content_key(key)?;

        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(self.config.object_key(key))
            .content_type("text/html")
            .body(ByteStream::from(html.as_bytes().to_vec()))
            .send()
            .await
            .map_err(|e| ContentError::Storage(format!("writing {key}: {e}")))?;

        tracing::debug!(key, bucket = %self.config.bucket, "Uploaded post content");
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "s3"
    }
}
