use {
    crate::{
        BlobStore, BusMessage, MessageBus, Result, SinkError, CONTENT_TYPE_JSON, HEADER_HEIGHT,
        HEADER_INDEX, HEADER_TOTAL,
    },
    emitter_types::{json, Record, RecordKey},
    sha2::{Digest, Sha256},
    std::{sync::Arc, time::Duration},
};

/// Largest serialized record, in bytes, that still goes to the bus inline.
pub const CLAIM_CHECK_THRESHOLD: usize = 1 << 20;

/// Bounded retries with linear backoff: after the `i`-th failed attempt
/// (1-based) the upload waits `i * backoff_unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit * attempt
    }
}

/// Publishes a block's records to the bus, offloading oversize ones to the
/// blob store and replacing them with a pointer.
#[derive(Clone)]
pub struct ClaimCheck {
    bus: Arc<dyn MessageBus>,
    blobs: Arc<dyn BlobStore>,
    threshold: usize,
    retry: RetryPolicy,
}

impl ClaimCheck {
    pub fn new(bus: Arc<dyn MessageBus>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            bus,
            blobs,
            threshold: CLAIM_CHECK_THRESHOLD,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Write the records as one ordered batch. Returns the number of messages
    /// published; an empty buffer publishes nothing.
    pub async fn flush(&self, height: u64, records: Vec<Record>) -> Result<usize> {
        let total = records.len();
        if total == 0 {
            return Ok(0);
        }

        let mut messages = Vec::with_capacity(total);
        for (index, record) in records.into_iter().enumerate() {
            let value = serde_json::to_vec(&record.value)?;

            let message = if value.len() > self.threshold {
                let object_path = object_path(height, record.key, &value);
                self.upload(&object_path, value).await?;

                let pointer = serde_json::to_vec(&json!({ "object_path": object_path }))?;
                BusMessage::new(RecordKey::ClaimCheck.as_ref(), pointer)
            } else {
                BusMessage::new(record.key.as_ref(), value)
            };

            messages.push(
                message
                    .with_header(HEADER_INDEX, index)
                    .with_header(HEADER_TOTAL, total)
                    .with_header(HEADER_HEIGHT, height),
            );
        }

        self.bus.publish(messages).await?;

        #[cfg(feature = "tracing")]
        tracing::info!(block_height = height, total, "Published records");

        Ok(total)
    }

    async fn upload(&self, object_path: &str, body: Vec<u8>) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::info!(object_path, size = body.len(), "Uploading oversize record");

        let mut last = String::new();
        for attempt in 1..=self.retry.attempts {
            match self
                .blobs
                .put(object_path, body.clone(), CONTENT_TYPE_JSON)
                .await
            {
                Ok(()) => return Ok(()),
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(object_path, attempt, error = %err, "Can't upload record");

                    last = err.to_string();
                },
            }

            if attempt < self.retry.attempts {
                tokio::time::sleep(self.retry.backoff(attempt)).await;
            }
        }

        Err(SinkError::UploadExhausted {
            path: object_path.to_string(),
            attempts: self.retry.attempts,
            last,
        })
    }
}

/// `{height}-{key}-{hex(sha256(value))}`.
pub fn object_path(height: u64, key: RecordKey, value: &[u8]) -> String {
    format!("{height}-{key}-{}", hex::encode(Sha256::digest(value)))
}

// ----------------------------------- tests -----------------------------------
