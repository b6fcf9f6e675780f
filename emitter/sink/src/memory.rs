use {
    crate::{BlobStore, BusMessage, MessageBus, Result, SinkError},
    async_trait::async_trait,
    std::{
        collections::BTreeMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Mutex,
        },
    },
};

/// A bus that keeps every published batch in memory.
///
/// Clones share the same storage, so a test can keep a handle while the
/// flusher owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryBus {
    batches: Arc<Mutex<Vec<Vec<BusMessage>>>>,
    failures: Arc<AtomicUsize>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` publish calls fail.
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub fn batches(&self) -> Result<Vec<Vec<BusMessage>>> {
        Ok(self.batches.lock()?.clone())
    }

    pub fn last_batch(&self) -> Result<Option<Vec<BusMessage>>> {
        Ok(self.batches.lock()?.last().cloned())
    }

    /// All published messages, in publish order.
    pub fn messages(&self) -> Result<Vec<BusMessage>> {
        Ok(self.batches.lock()?.iter().flatten().cloned().collect())
    }
}

#[async_trait]
impl MessageBus for MemoryBus {
    async fn publish(&self, messages: Vec<BusMessage>) -> Result<()> {
        if take_failure(&self.failures) {
            return Err(SinkError::Bus("injected publish failure".to_string()));
        }

        self.batches.lock()?.push(messages);

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// A blob store backed by a map, with optional injected failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<Mutex<BTreeMap<String, StoredBlob>>>,
    failures: Arc<AtomicUsize>,
    attempts: Arc<AtomicUsize>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` puts fail.
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    /// Number of put calls so far, failed ones included.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn get(&self, path: &str) -> Result<Option<StoredBlob>> {
        Ok(self.objects.lock()?.get(path).cloned())
    }

    pub fn paths(&self) -> Result<Vec<String>> {
        Ok(self.objects.lock()?.keys().cloned().collect())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, path: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if take_failure(&self.failures) {
            return Err(SinkError::Blob(format!("injected failure for `{path}`")));
        }

        self.objects.lock()?.insert(path.to_string(), StoredBlob {
            body,
            content_type: content_type.to_string(),
        });

        Ok(())
    }
}

fn take_failure(failures: &AtomicUsize) -> bool {
    failures
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, assertor::*};

    #[tokio::test]
    async fn blob_store_fails_then_recovers() {
        let store = MemoryBlobStore::new();
        store.fail_next(2);

        assert_that!(store.put("a", vec![1], "application/json").await).is_err();
        assert_that!(store.put("a", vec![1], "application/json").await).is_err();
        assert_that!(store.put("a", vec![1], "application/json").await).is_ok();

        assert_that!(store.attempts()).is_equal_to(3);
        assert_that!(store.paths().unwrap()).is_equal_to(vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn bus_clones_share_batches() {
        let bus = MemoryBus::new();
        let handle = bus.clone();

        bus.publish(vec![BusMessage::new("COMMIT", b"{}".to_vec())])
            .await
            .unwrap();

        assert_that!(handle.batches().unwrap()).has_length(1);
        assert_that!(handle.messages().unwrap()[0].key.as_str()).is_equal_to("COMMIT");
    }
}
