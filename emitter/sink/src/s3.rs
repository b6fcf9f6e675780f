use {
    crate::{BlobStore, EmitterConfig, Result, SinkError, CLAIM_CHECK_REGION},
    async_trait::async_trait,
    aws_config::BehaviorVersion,
    aws_sdk_s3::{
        config::{Credentials, Region},
        primitives::ByteStream,
        Client,
    },
};

/// S3 bucket holding claim-checked records.
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    pub async fn new(config: &EmitterConfig) -> Self {
        let credentials = Credentials::new(
            &config.aws_access_key,
            &config.aws_secret_key,
            None,
            None,
            "emitter",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(CLAIM_CHECK_REGION))
            .credentials_provider(credentials)
            .load()
            .await;

        Self {
            client: Client::new(&sdk_config),
            bucket: config.claim_check_bucket.clone(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, path: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| SinkError::Blob(err.to_string()))?;

        Ok(())
    }
}
