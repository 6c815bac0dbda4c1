//! S3-compatible object store
//!
//! Works against AWS S3 directly or against R2 / MinIO through a custom
//! endpoint with path-style addressing.

use async_trait::async_trait;
use aws_sdk_s3::{
    config::{BehaviorVersion, Builder, Credentials, Region},
    primitives::ByteStream,
    types::ObjectCannedAcl,
    Client as S3Client,
};
use tracing::{debug, info, instrument};

use crate::config::StorageSettings;

use super::{join_url, unique_key, ObjectStore, StorageError, StoredObject};

/// Object store for any S3-compatible endpoint
#[derive(Clone)]
pub struct S3Store {
    client: S3Client,
    bucket: String,
    region: String,
    endpoint: Option<String>,
    public_url_prefix: Option<String>,
    key_prefix: String,
    public_read: bool,
}

impl S3Store {
    /// Create a new store from settings
    pub async fn new(settings: &StorageSettings) -> Result<Self, StorageError> {
        if !settings.is_configured() {
            return Err(StorageError::NotConfigured("storage.bucket is empty".to_string()));
        }

        let region = Region::new(settings.region.clone());

        let mut builder = match (&settings.access_key_id, &settings.secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => {
                let credentials = Credentials::new(
                    access_key_id,
                    secret_access_key,
                    None, // session token
                    None, // expiry
                    "tee-mockup-static-credentials",
                );
                Builder::new()
                    .behavior_version(BehaviorVersion::latest())
                    .region(region)
                    .credentials_provider(credentials)
            }
            (None, None) => {
                debug!("No static storage credentials, using the default AWS provider chain");
                let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
                    .region(region)
                    .load()
                    .await;
                Builder::from(&shared)
            }
            _ => {
                return Err(StorageError::NotConfigured(
                    "access_key_id and secret_access_key must be set together".to_string(),
                ))
            }
        };

        if let Some(ref endpoint) = settings.endpoint {
            debug!("Using custom storage endpoint: {}", endpoint);
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(S3Store {
            client: S3Client::from_conf(builder.build()),
            bucket: settings.bucket.clone(),
            region: settings.region.clone(),
            endpoint: settings.endpoint.clone(),
            public_url_prefix: settings.public_url_prefix.clone(),
            key_prefix: settings.key_prefix.clone(),
            public_read: settings.public_read,
        })
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Public URL of an object
    pub fn object_url(&self, key: &str) -> String {
        if let Some(ref prefix) = self.public_url_prefix {
            return join_url(prefix, key);
        }
        match self.endpoint {
            Some(ref endpoint) => join_url(&join_url(endpoint, &self.bucket), key),
            None => format!("https://{}.s3.{}.amazonaws.com/{}", self.bucket, self.region, key),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    #[instrument(skip(self, data), fields(bucket = %self.bucket, size = data.len()))]
    async fn upload(
        &self,
        data: Vec<u8>,
        content_type: &str,
        suggested_name: &str,
    ) -> Result<StoredObject, StorageError> {
        let key = unique_key(&self.key_prefix, suggested_name);
        let size = data.len();

        debug!("Uploading {} bytes to {}", size, key);

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(content_type);

        if self.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        request
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("{:?}", e)))?;

        let url = self.object_url(&key);

        info!(key = %key, url = %url, bytes = size, "Uploaded object");

        Ok(StoredObject { url, key })
    }
}
