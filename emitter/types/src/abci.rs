use {
    crate::Result,
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

/// A typed key-value trace emitted by the host while executing a block.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Vec<EventAttribute>,
}

impl Event {
    pub fn new<T>(kind: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    pub fn add_attribute<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes.push(EventAttribute {
            key: key.into(),
            value: value.into(),
        });
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct EventAttribute {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct Header {
    pub chain_id: String,
    pub height: u64,
    pub time: DateTime<Utc>,
    /// Raw consensus address of the block proposer.
    pub proposer_address: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestInitChain {
    pub time: DateTime<Utc>,
    pub chain_id: String,
    /// The genesis app state: a JSON object keyed by module name.
    pub app_state_bytes: Vec<u8>,
    pub initial_height: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ResponseInitChain {
    pub app_hash: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestBeginBlock {
    pub hash: Vec<u8>,
    pub header: Header,
}

#[derive(Debug, Clone, Default)]
pub struct ResponseBeginBlock {
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestDeliverTx {
    pub tx: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct ResponseDeliverTx {
    pub code: u32,
    pub codespace: String,
    pub log: String,
    pub data: Vec<u8>,
    pub gas_wanted: i64,
    pub gas_used: i64,
    pub events: Vec<Event>,
}

impl ResponseDeliverTx {
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestEndBlock {
    pub height: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ResponseEndBlock {
    pub events: Vec<Event>,
}

/// The section of a successful transaction's log produced by one message.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AbciMessageLog {
    #[serde(default)]
    pub msg_index: u32,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Parse the JSON log of a successful transaction into its per-message logs.
///
/// An empty log yields no message logs.
pub fn parse_abci_logs(log: &str) -> Result<Vec<AbciMessageLog>> {
    if log.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(serde_json::from_str(log)?)
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, assertor::*};

    #[test]
    fn empty_log_has_no_messages() {
        assert_that!(parse_abci_logs("").unwrap()).is_empty();
    }

    #[test]
    fn parsing_message_logs() {
        let log = r#"[
            {"msg_index":0,"events":[{"type":"transfer","attributes":[{"key":"amount","value":"5uwasm"}]}]},
            {"msg_index":1,"log":"","events":[]}
        ]"#;

        let logs = parse_abci_logs(log).unwrap();

        assert_that!(logs).has_length(2);
        assert_that!(logs[0].events[0].kind.as_str()).is_equal_to("transfer");
        assert_that!(logs[1].msg_index).is_equal_to(1);
    }

    #[test]
    fn failure_log_is_not_json() {
        assert!(parse_abci_logs("out of gas in location: WriteFlat").is_err());
    }
}
