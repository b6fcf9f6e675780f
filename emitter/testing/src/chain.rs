use {
    emitter_types::{
        json, AccountKeeper, AuthAccount, Bech32Codec, CodeInfo, ContractCodeHistoryEntry,
        ContractCodeHistoryOperationType, ContractInfo, Ctx, DecodedTx, Fee, GovKeeper, Json,
        Keepers, Msg, Proposal, Sequence, StakingKeeper, TallyResult, TxCodec, TxMsg,
        TxResultEnvelope, TypesError, Validator, WasmKeeper,
    },
    std::{
        collections::BTreeMap,
        sync::{Arc, RwLock},
    },
};

/// Bech32 prefix of every address in the mock chain.
pub const PREFIX: &str = "wasm";

pub fn codec() -> Bech32Codec {
    Bech32Codec::new(PREFIX)
}

/// Account address with 20 bytes of `n`.
pub fn addr(n: u8) -> String {
    codec().encode_account(&[n; 20]).unwrap()
}

/// Operator address sharing the bytes of [`addr`].
pub fn valoper(n: u8) -> String {
    codec().encode_validator(&[n; 20]).unwrap()
}

/// Consensus address derived from a distinct key, as on a real chain.
pub fn valcons(n: u8) -> String {
    codec().encode_consensus(&valcons_bytes(n)).unwrap()
}

pub fn valcons_bytes(n: u8) -> Vec<u8> {
    vec![n.wrapping_add(100); 20]
}

#[derive(Debug, Default)]
pub struct MockState {
    pub validators: BTreeMap<String, Validator>,
    pub proposals: BTreeMap<u64, Proposal>,
    pub tallies: BTreeMap<u64, TallyResult>,
    pub codes: BTreeMap<u64, CodeInfo>,
    pub contracts: BTreeMap<String, ContractInfo>,
    pub histories: BTreeMap<String, Vec<ContractCodeHistoryEntry>>,
    pub raw: BTreeMap<(String, Vec<u8>), Vec<u8>>,
    pub next_code_id: u64,
    pub next_instance_id: u64,
    pub accounts: BTreeMap<String, AuthAccount>,
    pub txs: BTreeMap<Vec<u8>, DecodedTx>,
}

/// In-memory stand-in for the host's keepers and codec.
///
/// Clones share the same state, so a test can mutate the chain between
/// lifecycle callbacks while the hook holds its own handles.
#[derive(Debug, Clone, Default)]
pub struct MockChain {
    state: Arc<RwLock<MockState>>,
}

impl MockChain {
    pub fn new() -> Self {
        let chain = Self::default();
        chain.update(|state| {
            state.next_code_id = 1;
            state.next_instance_id = 1;
        });
        chain
    }

    pub fn keepers(&self) -> Keepers {
        Keepers {
            staking: Arc::new(self.clone()),
            gov: Arc::new(self.clone()),
            wasm: Arc::new(self.clone()),
            account: Arc::new(self.clone()),
            codec: Arc::new(self.clone()),
        }
    }

    pub fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut MockState) -> R,
    {
        f(&mut self.state.write().unwrap())
    }

    fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&MockState) -> R,
    {
        f(&self.state.read().unwrap())
    }

    /// Add a validator whose operator, account and consensus addresses are all
    /// derived from `n`.
    pub fn add_validator(&self, n: u8, moniker: &str, jailed: bool) -> Validator {
        let mut validator = Validator {
            operator_address: valoper(n),
            consensus_address: valcons(n),
            min_self_delegation: "1".to_string(),
            jailed,
            ..Default::default()
        };
        validator.description.moniker = moniker.to_string();
        validator.description.identity = format!("{moniker}-identity");
        validator.commission.rate = "0.100000000000000000".to_string();
        validator.commission.max_rate = "0.200000000000000000".to_string();
        validator.commission.max_change_rate = "0.010000000000000000".to_string();

        self.update(|state| {
            state
                .validators
                .insert(validator.operator_address.clone(), validator.clone());
        });

        validator
    }

    pub fn set_jailed(&self, n: u8, jailed: bool) {
        self.update(|state| {
            if let Some(validator) = state.validators.get_mut(&valoper(n)) {
                validator.jailed = jailed;
            }
        });
    }

    pub fn add_proposal(&self, proposal: Proposal) {
        self.update(|state| {
            state.proposals.insert(proposal.id, proposal);
        });
    }

    pub fn set_tally(&self, id: u64, tally: TallyResult) {
        self.update(|state| {
            state.tallies.insert(id, tally);
        });
    }

    /// Store a code under the next code ID and return that ID.
    pub fn store_code(&self, info: CodeInfo) -> u64 {
        self.update(|state| {
            let code_id = state.next_code_id;
            state.next_code_id += 1;
            state.codes.insert(code_id, info);
            code_id
        })
    }

    /// Instantiate a contract under the next instance ID and return its
    /// address.
    pub fn instantiate(&self, code_id: u64, creator: &str, label: &str, msg: &str) -> String {
        self.update(|state| {
            let instance_id = state.next_instance_id;
            state.next_instance_id += 1;

            let contract = codec().contract_address(code_id, instance_id).unwrap();
            state.contracts.insert(contract.clone(), ContractInfo {
                code_id,
                creator: creator.to_string(),
                admin: String::new(),
                label: label.to_string(),
            });
            state
                .histories
                .insert(contract.clone(), vec![ContractCodeHistoryEntry {
                    operation: ContractCodeHistoryOperationType::Init,
                    code_id,
                    msg: msg.to_string(),
                }]);

            contract
        })
    }

    pub fn set_cw2(&self, contract: &str, name: &str, version: &str) {
        let value = json!({ "contract": name, "version": version }).to_string();
        self.set_raw(contract, b"contract_info", value.into_bytes());
    }

    pub fn set_raw(&self, contract: &str, key: &[u8], value: Vec<u8>) {
        self.update(|state| {
            state.raw.insert((contract.to_string(), key.to_vec()), value);
        });
    }

    pub fn add_account(&self, address: &str, account: AuthAccount) {
        self.update(|state| {
            state.accounts.insert(address.to_string(), account);
        });
    }

    /// Make `tx` known to the codec under `bytes`.
    pub fn register_tx(&self, bytes: Vec<u8>, tx: DecodedTx) {
        self.update(|state| {
            state.txs.insert(bytes, tx);
        });
    }
}

impl StakingKeeper for MockChain {
    fn validator(&self, _ctx: &Ctx, operator_address: &str) -> Option<Validator> {
        self.read(|state| state.validators.get(operator_address).cloned())
    }

    fn validator_by_cons_addr(&self, _ctx: &Ctx, consensus_address: &str) -> Option<Validator> {
        self.read(|state| {
            state
                .validators
                .values()
                .find(|validator| validator.consensus_address == consensus_address)
                .cloned()
        })
    }
}

impl GovKeeper for MockChain {
    fn proposal(&self, _ctx: &Ctx, id: u64) -> Option<Proposal> {
        self.read(|state| state.proposals.get(&id).cloned())
    }

    fn tally(&self, _ctx: &Ctx, proposal: &Proposal) -> TallyResult {
        self.read(|state| state.tallies.get(&proposal.id).cloned().unwrap_or_default())
    }
}

impl WasmKeeper for MockChain {
    fn contract_info(&self, _ctx: &Ctx, contract: &str) -> Option<ContractInfo> {
        self.read(|state| state.contracts.get(contract).cloned())
    }

    fn contract_infos(&self, _ctx: &Ctx) -> Vec<(String, ContractInfo)> {
        self.read(|state| {
            state
                .contracts
                .iter()
                .map(|(address, info)| (address.clone(), info.clone()))
                .collect()
        })
    }

    fn code_info(&self, _ctx: &Ctx, code_id: u64) -> Option<CodeInfo> {
        self.read(|state| state.codes.get(&code_id).cloned())
    }

    fn contract_history(&self, _ctx: &Ctx, contract: &str) -> Vec<ContractCodeHistoryEntry> {
        self.read(|state| state.histories.get(contract).cloned().unwrap_or_default())
    }

    fn query_raw(&self, _ctx: &Ctx, contract: &str, key: &[u8]) -> Option<Vec<u8>> {
        self.read(|state| state.raw.get(&(contract.to_string(), key.to_vec())).cloned())
    }

    fn peek_auto_increment_id(&self, _ctx: &Ctx, sequence: Sequence) -> u64 {
        self.read(|state| match sequence {
            Sequence::LastCodeId => state.next_code_id,
            Sequence::LastInstanceId => state.next_instance_id,
        })
    }
}

impl AccountKeeper for MockChain {
    fn account(&self, _ctx: &Ctx, address: &str) -> Option<AuthAccount> {
        self.read(|state| state.accounts.get(address).cloned())
    }
}

impl TxCodec for MockChain {
    fn decode_tx(&self, tx: &[u8]) -> emitter_types::Result<DecodedTx> {
        self.read(|state| state.txs.get(tx).cloned())
            .ok_or_else(|| TypesError::Codec(format!("unknown tx {}", hex_string(tx))))
    }

    /// Understands the gen-tx shape `{"body": {"messages": [..]}}` and create
    /// validator messages; any other message decodes as [`Msg::Other`].
    fn decode_json_tx(&self, tx: &Json) -> emitter_types::Result<DecodedTx> {
        let messages = tx
            .pointer("/body/messages")
            .and_then(Json::as_array)
            .ok_or_else(|| TypesError::Codec("gen tx has no body.messages".to_string()))?;

        let messages = messages
            .iter()
            .map(|msg| {
                let type_url = msg["@type"].as_str().unwrap_or_default();
                let field = |name: &str| msg[name].as_str().unwrap_or_default().to_string();

                let (signers, kind) = match type_url {
                    "/cosmos.staking.v1beta1.MsgCreateValidator" => {
                        (vec![field("delegator_address")], Msg::CreateValidator {
                            validator_address: field("validator_address"),
                        })
                    },
                    _ => (vec![], Msg::Other),
                };

                TxMsg::new(type_url, signers, msg.clone(), kind)
            })
            .collect();

        Ok(DecodedTx {
            messages,
            fee: Some(Fee::default()),
            memo: Some(String::new()),
        })
    }

    fn tx_response_json(&self, envelope: &TxResultEnvelope) -> emitter_types::Result<Json> {
        let tx = self.decode_tx(envelope.tx)?;
        let messages = tx.messages.iter().map(|msg| msg.json.clone()).collect::<Vec<_>>();

        Ok(json!({
            "tx": {
                "body": {
                    "messages": messages,
                    "memo": tx.memo().unwrap_or_default(),
                },
                "auth_info": {
                    "fee": {
                        "amount": tx.fee.as_ref().map(|fee| fee.amount.clone()),
                        "gas_limit": tx.fee.as_ref().map(|fee| fee.gas_limit.to_string()),
                    },
                },
            },
            "tx_response": {
                "height": envelope.height.to_string(),
                "txhash": envelope.hash.to_string(),
                "code": envelope.result.code,
                "codespace": envelope.result.codespace,
                "raw_log": envelope.result.log,
                "gas_wanted": envelope.result.gas_wanted.to_string(),
                "gas_used": envelope.result.gas_used.to_string(),
                "timestamp": envelope.timestamp,
            },
        }))
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
