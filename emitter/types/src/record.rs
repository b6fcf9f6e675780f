use {
    serde_json::{Map, Value},
    strum_macros::{AsRefStr, Display, EnumIter, EnumString},
};

/// A JSON object whose keys keep insertion order.
pub type JsDict = Map<String, Value>;

/// The closed vocabulary of record keys. Downstream consumers dispatch on
/// these exact strings; new keys may be added but existing ones never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordKey {
    NewBlock,
    NewTransaction,
    SetAccount,
    SetValidator,
    UpdateValidator,
    NewProposal,
    UpdateProposal,
    NewProposalDeposit,
    NewProposalVote,
    NewCode,
    NewContract,
    NewContractHistory,
    UpdateCode,
    #[strum(serialize = "UPDATE_CW2_INFO")]
    UpdateCw2Info,
    UpdateContractAdmin,
    UpdateContractCodeId,
    NewContractProposal,
    UpdateContractProposal,
    NewCodeProposal,
    NewContractTransaction,
    #[strum(serialize = "INSERT_LCD_TX_RESULTS")]
    InsertLcdTxResults,
    SetRelatedTransaction,
    Commit,
    ClaimCheck,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub key: RecordKey,
    pub value: Value,
}

impl Record {
    pub fn new(key: RecordKey, value: Value) -> Self {
        Self { key, value }
    }
}

/// Position of a reserved record in a [`Records`] buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot(usize);

/// The ordered record buffer of the block being processed.
#[derive(Debug, Clone, Default)]
pub struct Records(Vec<Record>);

impl Records {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: RecordKey, value: Value) {
        self.0.push(Record::new(key, value));
    }

    /// Take a position in the buffer for a record whose value is only known
    /// after more records have been appended behind it.
    ///
    /// The slot stays valid until records are inserted before it.
    pub fn reserve(&mut self, key: RecordKey) -> Slot {
        self.0.push(Record::new(key, Value::Object(JsDict::new())));
        Slot(self.0.len() - 1)
    }

    pub fn fill(&mut self, slot: Slot, value: Value) {
        if let Some(record) = self.0.get_mut(slot.0) {
            record.value = value;
        }
    }

    /// Insert records right after the first one, keeping their order.
    pub fn insert_after_first<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = Record>,
    {
        let at = self.0.len().min(1);
        self.0.splice(at..at, records);
    }

    pub fn first(&self) -> Option<&Record> {
        self.0.first()
    }

    pub fn get(&self, idx: usize) -> Option<&Record> {
        self.0.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = RecordKey> + '_ {
        self.0.iter().map(|record| record.key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Empty the buffer, handing over its records.
    pub fn drain(&mut self) -> Vec<Record> {
        std::mem::take(&mut self.0)
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, assertor::*, serde_json::json, std::str::FromStr, strum::IntoEnumIterator};

    #[test]
    fn key_names() {
        assert_that!(RecordKey::NewContractHistory.to_string())
            .is_equal_to("NEW_CONTRACT_HISTORY".to_string());
        assert_that!(RecordKey::UpdateCw2Info.to_string())
            .is_equal_to("UPDATE_CW2_INFO".to_string());
        assert_that!(RecordKey::InsertLcdTxResults.to_string())
            .is_equal_to("INSERT_LCD_TX_RESULTS".to_string());
        assert_that!(RecordKey::UpdateContractCodeId.to_string())
            .is_equal_to("UPDATE_CONTRACT_CODE_ID".to_string());

        for key in RecordKey::iter() {
            assert_that!(RecordKey::from_str(key.as_ref()).unwrap()).is_equal_to(key);
        }
    }

    #[test]
    fn reserved_slots_keep_their_position() {
        let mut records = Records::new();
        records.push(RecordKey::NewBlock, json!({ "height": 1 }));
        let slot = records.reserve(RecordKey::NewTransaction);
        records.push(RecordKey::SetRelatedTransaction, json!({}));
        records.fill(slot, json!({ "success": true }));

        assert_that!(records.keys().collect::<Vec<_>>()).is_equal_to(vec![
            RecordKey::NewBlock,
            RecordKey::NewTransaction,
            RecordKey::SetRelatedTransaction,
        ]);
        assert_that!(records.get(1).unwrap().value).is_equal_to(json!({ "success": true }));
    }

    #[test]
    fn inserting_after_first() {
        let mut records = Records::new();
        records.push(RecordKey::NewBlock, json!({}));
        records.push(RecordKey::NewTransaction, json!({}));
        records.insert_after_first([
            Record::new(RecordKey::SetAccount, json!({ "address": "a" })),
            Record::new(RecordKey::SetAccount, json!({ "address": "b" })),
        ]);

        assert_that!(records.keys().collect::<Vec<_>>()).is_equal_to(vec![
            RecordKey::NewBlock,
            RecordKey::SetAccount,
            RecordKey::SetAccount,
            RecordKey::NewTransaction,
        ]);
        assert_that!(records.drain()).has_length(4);
        assert!(records.is_empty());
    }
}
