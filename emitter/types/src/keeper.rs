use {
    crate::{Coins, ResponseDeliverTx, Result, TxHash, TxMsg},
    chrono::{DateTime, SecondsFormat, Utc},
    serde::{Deserialize, Serialize},
    serde_json::Value,
    std::sync::Arc,
    strum_macros::Display,
};

/// The host context of a lifecycle callback.
#[derive(Debug, Clone, Default)]
pub struct Ctx {
    pub block_height: u64,
    pub block_time: DateTime<Utc>,
    pub chain_id: String,
}

impl Ctx {
    pub fn new<T>(chain_id: T, block_height: u64, block_time: DateTime<Utc>) -> Self
    where
        T: Into<String>,
    {
        Self {
            block_height,
            block_time,
            chain_id: chain_id.into(),
        }
    }
}

/// Nanoseconds since the Unix epoch, the timestamp form used in records.
pub fn unix_nanos(time: &DateTime<Utc>) -> i64 {
    time.timestamp_nanos_opt().unwrap_or_default()
}

/// RFC 3339 with whole seconds and a `Z` suffix, the LCD timestamp form.
pub fn rfc3339(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ---------------------------------- staking ----------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Description {
    pub moniker: String,
    pub identity: String,
    pub website: String,
    pub security_contact: String,
    pub details: String,
}

/// Commission rates, as decimal strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commission {
    pub rate: String,
    pub max_rate: String,
    pub max_change_rate: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    pub operator_address: String,
    /// Bech32 consensus address, derived by the host from the consensus key.
    pub consensus_address: String,
    pub description: Description,
    pub commission: Commission,
    pub min_self_delegation: String,
    pub jailed: bool,
}

pub trait StakingKeeper: Send + Sync {
    fn validator(&self, ctx: &Ctx, operator_address: &str) -> Option<Validator>;

    fn validator_by_cons_addr(&self, ctx: &Ctx, consensus_address: &str) -> Option<Validator>;
}

// ------------------------------------ gov ------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(i32)]
pub enum ProposalStatus {
    #[default]
    Unspecified = 0,
    DepositPeriod = 1,
    VotingPeriod = 2,
    Passed = 3,
    Rejected = 4,
    Failed = 5,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Proposal {
    pub id: u64,
    pub messages: Vec<TxMsg>,
    pub status: ProposalStatus,
    pub total_deposit: Coins,
    pub submit_time: DateTime<Utc>,
    pub deposit_end_time: DateTime<Utc>,
    pub voting_start_time: DateTime<Utc>,
    pub voting_end_time: DateTime<Utc>,
    pub metadata: String,
}

/// Vote tally of a proposal; counts are integer strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TallyResult {
    pub yes_count: String,
    pub abstain_count: String,
    pub no_count: String,
    pub no_with_veto_count: String,
}

pub trait GovKeeper: Send + Sync {
    fn proposal(&self, ctx: &Ctx, id: u64) -> Option<Proposal>;

    fn tally(&self, ctx: &Ctx, proposal: &Proposal) -> TallyResult;
}

// ------------------------------------ wasm -----------------------------------

/// Who may instantiate a code. Accepts both the protobuf enum names and the
/// short names in JSON; displays as the short name.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum AccessType {
    #[default]
    #[serde(rename = "ACCESS_TYPE_UNSPECIFIED", alias = "Unspecified")]
    Unspecified,
    #[serde(rename = "ACCESS_TYPE_NOBODY", alias = "Nobody")]
    Nobody,
    #[serde(rename = "ACCESS_TYPE_ONLY_ADDRESS", alias = "OnlyAddress")]
    OnlyAddress,
    #[serde(rename = "ACCESS_TYPE_EVERYBODY", alias = "Everybody")]
    Everybody,
    #[serde(rename = "ACCESS_TYPE_ANY_OF_ADDRESSES", alias = "AnyOfAddresses")]
    AnyOfAddresses,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessConfig {
    pub permission: AccessType,
    #[serde(default)]
    pub addresses: Vec<String>,
}

impl AccessConfig {
    /// The explicit allow-list, which only exists for `AnyOfAddresses`.
    pub fn allowed_addresses(&self) -> Vec<String> {
        match self.permission {
            AccessType::AnyOfAddresses => self.addresses.clone(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeInfo {
    pub code_hash: Vec<u8>,
    pub creator: String,
    pub instantiate_config: AccessConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractInfo {
    pub code_id: u64,
    pub creator: String,
    pub admin: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum ContractCodeHistoryOperationType {
    #[default]
    #[strum(serialize = "CONTRACT_CODE_HISTORY_OPERATION_TYPE_UNSPECIFIED")]
    Unspecified,
    #[strum(serialize = "CONTRACT_CODE_HISTORY_OPERATION_TYPE_INIT")]
    Init,
    #[strum(serialize = "CONTRACT_CODE_HISTORY_OPERATION_TYPE_MIGRATE")]
    Migrate,
    #[strum(serialize = "CONTRACT_CODE_HISTORY_OPERATION_TYPE_GENESIS")]
    Genesis,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractCodeHistoryEntry {
    pub operation: ContractCodeHistoryOperationType,
    pub code_id: u64,
    /// The raw JSON message of the operation.
    pub msg: String,
}

/// The auto-increment sequences of the contract VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    LastCodeId,
    LastInstanceId,
}

pub trait WasmKeeper: Send + Sync {
    fn contract_info(&self, ctx: &Ctx, contract: &str) -> Option<ContractInfo>;

    /// Every contract, in the keeper's iteration order.
    fn contract_infos(&self, ctx: &Ctx) -> Vec<(String, ContractInfo)>;

    fn code_info(&self, ctx: &Ctx, code_id: u64) -> Option<CodeInfo>;

    fn contract_history(&self, ctx: &Ctx, contract: &str) -> Vec<ContractCodeHistoryEntry>;

    fn query_raw(&self, ctx: &Ctx, contract: &str, key: &[u8]) -> Option<Vec<u8>>;

    /// The next value the sequence will hand out, without consuming it.
    fn peek_auto_increment_id(&self, ctx: &Ctx, sequence: Sequence) -> u64;
}

// ------------------------------------ auth -----------------------------------

/// Account kinds, with the ordinals downstream consumers store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum AccountKind {
    Base = 0,
    Interchain = 1,
    Module = 2,
    ContinuousVesting = 3,
    DelayedVesting = 4,
    ClawbackVesting = 5,
    Contract = 6,
    PeriodicVesting = 7,
    PermanentLocked = 8,
    BaseVesting = 9,
}

impl AccountKind {
    pub fn ordinal(self) -> i32 {
        self as i32
    }
}

/// An account as stored by the host's account keeper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAccount {
    Base,
    Module { name: String },
    Interchain,
    ContinuousVesting,
    DelayedVesting,
    PeriodicVesting,
    ClawbackVesting,
    PermanentLocked,
    BaseVesting,
}

pub trait AccountKeeper: Send + Sync {
    fn account(&self, ctx: &Ctx, address: &str) -> Option<AuthAccount>;
}

// ------------------------------------ codec ----------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fee {
    pub amount: Coins,
    pub gas_limit: u64,
}

/// A transaction decoded by the host.
///
/// The fee and memo facets are optional because not every transaction type
/// carries them; the emitter requires both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedTx {
    pub messages: Vec<TxMsg>,
    pub fee: Option<Fee>,
    pub memo: Option<String>,
}

impl DecodedTx {
    pub fn fee(&self) -> Option<&Fee> {
        self.fee.as_ref()
    }

    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref()
    }

    /// Signers of the first message, which pays for and signs the transaction.
    pub fn signers(&self) -> Option<&[String]> {
        self.messages.first().map(|msg| msg.signers.as_slice())
    }
}

/// Everything the host needs to render the LCD `GetTxResponse` of a
/// delivered transaction.
#[derive(Debug, Clone)]
pub struct TxResultEnvelope<'a> {
    pub hash: TxHash,
    pub height: u64,
    pub tx: &'a [u8],
    pub result: &'a ResponseDeliverTx,
    /// Block time in RFC 3339.
    pub timestamp: String,
}

pub trait TxCodec: Send + Sync {
    fn decode_tx(&self, tx: &[u8]) -> Result<DecodedTx>;

    /// Decode a transaction from its JSON form, as found in genesis gen-txs.
    fn decode_json_tx(&self, tx: &Value) -> Result<DecodedTx>;

    /// The LCD `GetTxResponse` JSON: `{"tx": {..}, "tx_response": {..}}`, with
    /// the decoded messages under `tx.body.messages`.
    fn tx_response_json(&self, envelope: &TxResultEnvelope) -> Result<Value>;
}

// ----------------------------------- keepers ---------------------------------

/// Read-only handles to the host's keepers and codec.
#[derive(Clone)]
pub struct Keepers {
    pub staking: Arc<dyn StakingKeeper>,
    pub gov: Arc<dyn GovKeeper>,
    pub wasm: Arc<dyn WasmKeeper>,
    pub account: Arc<dyn AccountKeeper>,
    pub codec: Arc<dyn TxCodec>,
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, assertor::*, serde_json::json};

    #[test]
    fn account_kind_ordinals() {
        assert_that!(AccountKind::Base.ordinal()).is_equal_to(0);
        assert_that!(AccountKind::ClawbackVesting.ordinal()).is_equal_to(5);
        assert_that!(AccountKind::Contract.ordinal()).is_equal_to(6);
        assert_that!(AccountKind::BaseVesting.ordinal()).is_equal_to(9);
    }

    #[test]
    fn access_config_forms() {
        let config: AccessConfig = serde_json::from_value(json!({
            "permission": "ACCESS_TYPE_ANY_OF_ADDRESSES",
            "addresses": ["a", "b"],
        }))
        .unwrap();
        assert_that!(config.permission.to_string()).is_equal_to("AnyOfAddresses".to_string());
        assert_that!(config.allowed_addresses()).has_length(2);

        let config: AccessConfig = serde_json::from_value(json!({
            "permission": "Everybody",
            "addresses": ["ignored"],
        }))
        .unwrap();
        assert_that!(config.allowed_addresses()).is_empty();
    }

    #[test]
    fn history_operation_names() {
        assert_that!(ContractCodeHistoryOperationType::Migrate.to_string())
            .is_equal_to("CONTRACT_CODE_HISTORY_OPERATION_TYPE_MIGRATE".to_string());
    }
}
