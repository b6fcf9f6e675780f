use {crate::Result, async_trait::async_trait, serde_json::Value};

pub const HEADER_INDEX: &str = "index";
pub const HEADER_TOTAL: &str = "total";
pub const HEADER_HEIGHT: &str = "height";

/// A keyed message ready to be written to the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub key: String,
    pub value: Vec<u8>,
    pub headers: Vec<(String, String)>,
}

impl BusMessage {
    pub fn new<K>(key: K, value: Vec<u8>) -> Self
    where
        K: Into<String>,
    {
        Self {
            key: key.into(),
            value,
            headers: Vec::new(),
        }
    }

    pub fn with_header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        self.headers.push((key.into(), value.to_string()));
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn value_json(&self) -> Result<Value> {
        Ok(serde_json::from_slice(&self.value)?)
    }
}

/// The downstream message bus. A batch is written in order, and either all of
/// it is acknowledged or the call fails.
#[async_trait]
pub trait MessageBus: Send + Sync {
    async fn publish(&self, messages: Vec<BusMessage>) -> Result<()>;
}
