use {crate::Result, async_trait::async_trait};

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Object storage holding the payloads too large for the bus.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, path: &str, body: Vec<u8>, content_type: &str) -> Result<()>;
}
