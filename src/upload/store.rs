use async_trait::async_trait;

use crate::upload::types::UploadError;

/// Existence queries against the destination object store.
///
/// The uploader only ever asks whether a key is already present; the actual
/// byte transfer goes through the external upload command.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Whether `key` already exists in the destination bucket.
    async fn exists(&self, key: &str) -> Result<bool, UploadError>;
}

#[cfg(feature = "s3")]
pub use s3::S3RemoteStore;

#[cfg(feature = "s3")]
mod s3 {
    use super::*;
    use aws_config::BehaviorVersion;
    use tracing::debug;

    /// [`RemoteStore`] backed by S3 `HeadObject` calls.
    pub struct S3RemoteStore {
        client: aws_sdk_s3::Client,
        bucket: String,
    }

    impl S3RemoteStore {
        /// Connect using the ambient AWS environment (credentials chain,
        /// region, endpoint overrides).
        pub async fn connect(bucket: impl Into<String>) -> Self {
            let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
            Self {
                client: aws_sdk_s3::Client::new(&config),
                bucket: bucket.into(),
            }
        }

        /// Build from an existing client, for custom endpoints or tests.
        pub fn with_client(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
            Self {
                client,
                bucket: bucket.into(),
            }
        }
    }

    #[async_trait]
    impl RemoteStore for S3RemoteStore {
        async fn exists(&self, key: &str) -> Result<bool, UploadError> {
            match self
                .client
                .head_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
            {
                Ok(_) => Ok(true),
                Err(e) => {
                    let service_error = e.into_service_error();
                    if service_error.is_not_found() {
                        debug!(key, "key not present remotely");
                        Ok(false)
                    } else {
                        Err(UploadError::Remote(format!(
                            "HeadObject s3://{}/{} failed: {}",
                            self.bucket, key, service_error
                        )))
                    }
                }
            }
        }
    }
}
