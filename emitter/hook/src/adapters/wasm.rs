use {
    crate::{Adapter, Genesis, HookError, Result},
    emitter_types::{
        base64_bytes, json, AccessConfig, Bech32Codec, ContentKind, ContractCodeHistoryEntry,
        ContractCodeHistoryOperationType, ContractInfo, Ctx, EvMap, GovKeeper, JsDict, Json, Msg,
        RecordKey, Records, RequestBeginBlock, RequestEndBlock, Sequence, TxHash, TxMsg,
        WasmKeeper,
    },
    serde::Deserialize,
    std::{collections::BTreeSet, sync::Arc},
};

/// Raw storage key under which contracts publish their CW2 version info.
pub const CW2_INFO_KEY: &[u8] = b"contract_info";

/// The `proposal_result` of an active proposal that passed.
pub const PROPOSAL_PASSED: &str = "proposal_passed";

const CONTRACT_ADDRESS: &str = "_contract_address";

#[derive(Deserialize)]
struct ContractVersion {
    contract: String,
    version: String,
}

/// A contract operation, issued by a transaction message or carried by a
/// governance proposal (directly or as legacy content).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContractAction<'a> {
    StoreCode,
    Instantiate { code_id: u64 },
    Migrate { contract: &'a str, code_id: u64 },
    Execute { contract: &'a str },
    Sudo { contract: &'a str },
    UpdateAdmin { contract: &'a str, new_admin: &'a str },
    ClearAdmin { contract: &'a str },
}

impl<'a> ContractAction<'a> {
    fn of_proposal_msg(msg: &'a TxMsg) -> Option<Self> {
        let action = match &msg.kind {
            Msg::ExecLegacyContent { content } => match &content.kind {
                ContentKind::StoreCode => Self::StoreCode,
                ContentKind::InstantiateContract { code_id } => Self::Instantiate {
                    code_id: *code_id,
                },
                ContentKind::MigrateContract { contract, code_id } => Self::Migrate {
                    contract,
                    code_id: *code_id,
                },
                ContentKind::ExecuteContract { contract } => Self::Execute { contract },
                ContentKind::SudoContract { contract } => Self::Sudo { contract },
                ContentKind::UpdateAdmin {
                    contract,
                    new_admin,
                } => Self::UpdateAdmin {
                    contract,
                    new_admin,
                },
                ContentKind::ClearAdmin { contract } => Self::ClearAdmin { contract },
                ContentKind::Text | ContentKind::Other => return None,
            },
            Msg::StoreCode => Self::StoreCode,
            Msg::InstantiateContract { code_id } => Self::Instantiate { code_id: *code_id },
            Msg::MigrateContract { contract, code_id } => Self::Migrate {
                contract,
                code_id: *code_id,
            },
            Msg::ExecuteContract { contract, .. } => Self::Execute { contract },
            Msg::SudoContract { contract } => Self::Sudo { contract },
            Msg::UpdateAdmin {
                contract,
                new_admin,
            } => Self::UpdateAdmin {
                contract,
                new_admin,
            },
            Msg::ClearAdmin { contract } => Self::ClearAdmin { contract },
            _ => return None,
        };

        Some(action)
    }

    /// The existing contract the action targets, if any.
    fn target(self) -> Option<&'a str> {
        match self {
            Self::Migrate { contract, .. }
            | Self::Execute { contract }
            | Self::Sudo { contract }
            | Self::UpdateAdmin { contract, .. }
            | Self::ClearAdmin { contract } => Some(contract),
            Self::StoreCode | Self::Instantiate { .. } => None,
        }
    }
}

#[derive(Debug, Default)]
struct TxFlags {
    is_store_code: bool,
    is_instantiate: bool,
    is_execute: bool,
    is_update_admin: bool,
    is_clear_admin: bool,
    is_migrate: bool,
}

/// Tracks codes, contracts, their history and the transactions touching them.
pub struct WasmAdapter {
    wasm: Arc<dyn WasmKeeper>,
    gov: Arc<dyn GovKeeper>,
    codec: Bech32Codec,
    flags: TxFlags,
    /// Contracts touched by the current transaction.
    contract_txs: BTreeSet<String>,
    /// The next code ID as of the start of the block, or of the last store.
    max_code_id: u64,
    /// The next instance ID as of the last delivered transaction.
    last_instance_id: u64,
}

impl WasmAdapter {
    pub fn new(wasm: Arc<dyn WasmKeeper>, gov: Arc<dyn GovKeeper>, codec: Bech32Codec) -> Self {
        Self {
            wasm,
            gov,
            codec,
            flags: TxFlags::default(),
            contract_txs: BTreeSet::new(),
            max_code_id: 0,
            last_instance_id: 0,
        }
    }

    fn contract_info(&self, ctx: &Ctx, contract: &str) -> ContractInfo {
        self.wasm.contract_info(ctx, contract).unwrap_or_default()
    }

    /// Emit `UPDATE_CW2_INFO` for a contract that publishes it.
    fn update_contract_version(&self, ctx: &Ctx, contract: &str, records: &mut Records) {
        let Some(raw) = self.wasm.query_raw(ctx, contract, CW2_INFO_KEY) else {
            return;
        };

        let version = match serde_json::from_slice::<ContractVersion>(&raw) {
            Ok(version) => version,
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(contract, err = %_err, "Skipping malformed CW2 info");

                return;
            },
        };

        records.push(
            RecordKey::UpdateCw2Info,
            json!({
                "code_id": self.contract_info(ctx, contract).code_id,
                "cw2_contract": version.contract,
                "cw2_version": version.version,
            }),
        );
    }

    fn new_contract(
        &self,
        contract: &str,
        entry: &ContractCodeHistoryEntry,
        info: &ContractInfo,
        tx_hash: Option<&TxHash>,
    ) -> Json {
        let mut dict = JsDict::new();
        dict.insert("address".to_string(), json!(contract));
        dict.insert("code_id".to_string(), json!(entry.code_id));
        dict.insert("init_msg".to_string(), json!(entry.msg));
        if let Some(tx_hash) = tx_hash {
            dict.insert("tx_hash".to_string(), json!(tx_hash));
        }
        dict.insert("init_by".to_string(), json!(info.creator));
        dict.insert("contract_executed".to_string(), json!(0));
        dict.insert("label".to_string(), json!(info.label));
        dict.insert("admin".to_string(), json!(info.admin));

        Json::Object(dict)
    }

    /// Emit a code in the block's code-ID window, as created by a passed
    /// proposal. Returns `false` once the keeper has no such code.
    fn new_code_from_proposal(
        &self,
        ctx: &Ctx,
        code_id: u64,
        proposal_id: u64,
        records: &mut Records,
    ) -> bool {
        let Some(code_info) = self.wasm.code_info(ctx, code_id) else {
            return false;
        };

        let mut code = new_code(code_id, &code_info.creator, &code_info.instantiate_config);
        code.insert("hash".to_string(), json!(base64_bytes(&code_info.code_hash)));
        records.push(RecordKey::NewCode, Json::Object(code));
        records.push(
            RecordKey::NewCodeProposal,
            json!({
                "code_id": code_id,
                "proposal_id": proposal_id,
                "resolved_height": ctx.block_height,
            }),
        );

        true
    }

    fn new_contract_from_proposal(
        &self,
        ctx: &Ctx,
        code_id: u64,
        proposal_id: u64,
        records: &mut Records,
    ) -> Result<()> {
        let contract = self.codec.contract_address(code_id, self.last_instance_id)?;
        self.update_contract_version(ctx, &contract, records);

        let info = self.contract_info(ctx, &contract);

        // Only the first history entry can be the instantiation.
        let history = self.wasm.contract_history(ctx, &contract);
        let Some(entry) = history.first() else {
            return Ok(());
        };

        if entry.operation != ContractCodeHistoryOperationType::Init {
            return Ok(());
        }

        records.push(
            RecordKey::NewContract,
            self.new_contract(&contract, entry, &info, None),
        );
        records.push(RecordKey::UpdateCode, json!({ "id": info.code_id }));
        records.push(
            RecordKey::NewContractProposal,
            json!({
                "contract_address": contract,
                "proposal_id": proposal_id,
                "resolved_height": ctx.block_height,
            }),
        );
        records.push(
            RecordKey::NewContractHistory,
            contract_history(ctx, &contract, &info.creator, entry.code_id, json!({
                "type": "governance",
                "operation": ContractCodeHistoryOperationType::Init.to_string(),
                "value": proposal_id,
            })),
        );

        Ok(())
    }

    fn resolve_proposal(
        &mut self,
        ctx: &Ctx,
        proposal_id: u64,
        records: &mut Records,
    ) -> Result<()> {
        let proposal = self.gov.proposal(ctx, proposal_id).unwrap_or_default();
        let update_contract_proposal = |contract: &str| {
            json!({
                "contract_address": contract,
                "proposal_id": proposal_id,
                "resolved_height": ctx.block_height,
            })
        };

        for msg in &proposal.messages {
            let Some(action) = ContractAction::of_proposal_msg(msg) else {
                continue;
            };

            match action {
                ContractAction::StoreCode => {
                    let next_code_id = self.wasm.peek_auto_increment_id(ctx, Sequence::LastCodeId);
                    for code_id in self.max_code_id..next_code_id {
                        if !self.new_code_from_proposal(ctx, code_id, proposal_id, records) {
                            break;
                        }
                    }
                    self.max_code_id = next_code_id;
                },
                ContractAction::Instantiate { code_id } => {
                    self.new_contract_from_proposal(ctx, code_id, proposal_id, records)?;
                },
                ContractAction::Migrate { contract, code_id } => {
                    self.update_contract_version(ctx, contract, records);
                    records.push(
                        RecordKey::UpdateContractCodeId,
                        json!({
                            "contract": contract,
                            "code_id": code_id,
                        }),
                    );
                    records.push(
                        RecordKey::UpdateContractProposal,
                        update_contract_proposal(contract),
                    );
                    // The sender is reported as the contract itself.
                    records.push(
                        RecordKey::NewContractHistory,
                        contract_history(ctx, contract, contract, code_id, json!({
                            "type": "governance",
                            "operation": ContractCodeHistoryOperationType::Migrate.to_string(),
                            "value": proposal_id,
                        })),
                    );
                },
                ContractAction::UpdateAdmin {
                    contract,
                    new_admin,
                } => {
                    records.push(
                        RecordKey::UpdateContractAdmin,
                        json!({
                            "contract": contract,
                            "admin": new_admin,
                        }),
                    );
                    records.push(
                        RecordKey::UpdateContractProposal,
                        update_contract_proposal(contract),
                    );
                },
                ContractAction::ClearAdmin { contract } => {
                    records.push(
                        RecordKey::UpdateContractAdmin,
                        json!({
                            "contract": contract,
                            "admin": "",
                        }),
                    );
                    records.push(
                        RecordKey::UpdateContractProposal,
                        update_contract_proposal(contract),
                    );
                },
                ContractAction::Execute { contract } => {
                    records.push(
                        RecordKey::UpdateContractProposal,
                        update_contract_proposal(contract),
                    );
                },
                ContractAction::Sudo { .. } => {},
            }
        }

        Ok(())
    }

    fn handle_store_code_events(
        &mut self,
        ctx: &Ctx,
        tx_hash: &TxHash,
        msg: &TxMsg,
        ev_map: &EvMap,
        records: &mut Records,
    ) -> Result<()> {
        let Some(code_ids) = ev_map.u64s("store_code", "code_id")? else {
            return Ok(());
        };

        for code_id in code_ids {
            let code_info = self.wasm.code_info(ctx, code_id).unwrap_or_default();
            self.max_code_id = self.wasm.peek_auto_increment_id(ctx, Sequence::LastCodeId);

            let mut code = new_code(
                code_id,
                msg.first_signer().unwrap_or_default(),
                &code_info.instantiate_config,
            );
            code.insert("tx_hash".to_string(), json!(tx_hash));
            records.push(RecordKey::NewCode, Json::Object(code));
        }

        Ok(())
    }

    fn handle_instantiate_events(
        &mut self,
        ctx: &Ctx,
        tx_hash: &TxHash,
        ev_map: &EvMap,
        records: &mut Records,
    ) {
        for contract in ev_map.get("instantiate", CONTRACT_ADDRESS).unwrap_or_default() {
            let history = self.wasm.contract_history(ctx, contract);
            let info = self.contract_info(ctx, contract);
            self.update_contract_version(ctx, contract, records);

            let Some(entry) = history
                .iter()
                .find(|entry| entry.operation == ContractCodeHistoryOperationType::Init)
            else {
                continue;
            };

            records.push(
                RecordKey::NewContract,
                self.new_contract(contract, entry, &info, Some(tx_hash)),
            );
            records.push(RecordKey::UpdateCode, json!({ "id": info.code_id }));
            records.push(
                RecordKey::NewContractHistory,
                contract_history(ctx, contract, &info.creator, entry.code_id, json!({
                    "type": "transaction",
                    "operation": entry.operation.to_string(),
                    "value": tx_hash.to_string(),
                })),
            );

            self.contract_txs.insert(contract.clone());
        }
    }

    fn handle_proposal_events(
        &self,
        ctx: &Ctx,
        ev_map: &EvMap,
        records: &mut Records,
    ) -> Result<()> {
        let Some(proposal_ids) = ev_map.u64s("submit_proposal", "proposal_id")? else {
            return Ok(());
        };

        for proposal_id in proposal_ids {
            let proposal = self.gov.proposal(ctx, proposal_id).unwrap_or_default();
            for msg in &proposal.messages {
                let target = ContractAction::of_proposal_msg(msg).and_then(|a| a.target());
                if let Some(contract) = target {
                    records.push(
                        RecordKey::NewContractProposal,
                        json!({
                            "contract_address": contract,
                            "proposal_id": proposal_id,
                        }),
                    );
                }
            }
        }

        Ok(())
    }

    fn handle_migrate_events(
        &mut self,
        ctx: &Ctx,
        tx_hash: &TxHash,
        msg: &TxMsg,
        ev_map: &EvMap,
        records: &mut Records,
    ) -> Result<()> {
        let Some(migrations) = ev_map.paired("migrate", CONTRACT_ADDRESS, "code_id")? else {
            return Ok(());
        };

        for (contract, code_id) in migrations {
            let code_id = code_id
                .parse::<u64>()
                .map_err(|_| HookError::Fatal(format!("code id `{code_id}` is not an integer")))?;

            self.update_contract_version(ctx, contract, records);
            records.push(
                RecordKey::UpdateContractCodeId,
                json!({
                    "contract": contract,
                    "code_id": code_id,
                }),
            );
            records.push(
                RecordKey::NewContractHistory,
                contract_history(
                    ctx,
                    contract,
                    msg.first_signer().unwrap_or_default(),
                    code_id,
                    json!({
                        "type": "transaction",
                        "operation": ContractCodeHistoryOperationType::Migrate.to_string(),
                        "value": tx_hash.to_string(),
                    }),
                ),
            );

            self.contract_txs.insert(contract.to_string());
        }

        Ok(())
    }
}

impl Adapter for WasmAdapter {
    fn after_init_chain(
        &mut self,
        ctx: &Ctx,
        genesis: &Genesis,
        records: &mut Records,
    ) -> Result<()> {
        for code in &genesis.codes {
            let code = new_code(
                code.code_id,
                &code.code_info.creator,
                &code.code_info.instantiate_config,
            );
            records.push(RecordKey::NewCode, Json::Object(code));
        }

        for (contract, info) in self.wasm.contract_infos(ctx) {
            let history = self.wasm.contract_history(ctx, &contract);
            self.update_contract_version(ctx, &contract, records);

            for entry in &history {
                if entry.operation != ContractCodeHistoryOperationType::Init {
                    continue;
                }

                records.push(
                    RecordKey::NewContract,
                    self.new_contract(&contract, entry, &info, None),
                );
                records.push(RecordKey::UpdateCode, json!({ "id": info.code_id }));
                records.push(
                    RecordKey::NewContractHistory,
                    contract_history(ctx, &contract, &info.creator, entry.code_id, json!({
                        "type": "genesis",
                        "operation": entry.operation.to_string(),
                    })),
                );
            }
        }

        Ok(())
    }

    fn after_begin_block(
        &mut self,
        ctx: &Ctx,
        _req: &RequestBeginBlock,
        _ev_map: &EvMap,
        _records: &mut Records,
    ) -> Result<()> {
        self.max_code_id = self.wasm.peek_auto_increment_id(ctx, Sequence::LastCodeId);
        self.last_instance_id = self
            .wasm
            .peek_auto_increment_id(ctx, Sequence::LastInstanceId);

        Ok(())
    }

    fn pre_deliver_tx(&mut self) {
        self.flags = TxFlags::default();
        self.contract_txs.clear();
    }

    fn check_msg(&mut self, _ctx: &Ctx, msg: &TxMsg) {
        match &msg.kind {
            Msg::StoreCode => self.flags.is_store_code = true,
            Msg::InstantiateContract { .. } | Msg::InstantiateContract2 { .. } => {
                self.flags.is_instantiate = true;
            },
            Msg::ExecuteContract { contract, .. } => {
                self.flags.is_execute = true;
                self.contract_txs.insert(contract.clone());
            },
            Msg::UpdateAdmin { contract, .. } => {
                self.flags.is_update_admin = true;
                self.contract_txs.insert(contract.clone());
            },
            Msg::ClearAdmin { contract } => {
                self.flags.is_clear_admin = true;
                self.contract_txs.insert(contract.clone());
            },
            Msg::MigrateContract { contract, .. } => {
                self.flags.is_migrate = true;
                self.contract_txs.insert(contract.clone());
            },
            Msg::Ibc(ibc) => {
                let contract = ibc
                    .contract_port()
                    .and_then(|port| self.codec.contract_from_port_id(port).ok());
                if let Some(contract) = contract {
                    self.contract_txs.insert(contract);
                }
            },
            _ => {},
        }
    }

    fn handle_msg_events(
        &mut self,
        ctx: &Ctx,
        tx_hash: &TxHash,
        msg: &TxMsg,
        ev_map: &EvMap,
        detail: &mut JsDict,
        records: &mut Records,
    ) -> Result<()> {
        self.handle_store_code_events(ctx, tx_hash, msg, ev_map, records)?;
        self.handle_instantiate_events(ctx, tx_hash, ev_map, records);

        for kind in ["execute", "sudo"] {
            for contract in ev_map.get(kind, CONTRACT_ADDRESS).unwrap_or_default() {
                self.contract_txs.insert(contract.clone());
            }
        }

        self.handle_proposal_events(ctx, ev_map, records)?;
        self.handle_migrate_events(ctx, tx_hash, msg, ev_map, records)?;

        match &msg.kind {
            Msg::StoreCode => {
                let code_id = ev_map
                    .u64s("store_code", "code_id")?
                    .and_then(|ids| ids.first().copied())
                    .ok_or_else(|| HookError::Fatal("store code without code id".to_string()))?;

                detail.insert("id".to_string(), json!(code_id));
            },
            Msg::InstantiateContract { .. } | Msg::InstantiateContract2 { .. } => {
                let contracts = ev_map
                    .get("instantiate", CONTRACT_ADDRESS)
                    .filter(|contracts| !contracts.is_empty())
                    .ok_or_else(|| {
                        HookError::Fatal("instantiation without contract address".to_string())
                    })?;

                detail.insert("_contract_address".to_string(), json!(contracts[0]));
                detail.insert("_contract_addresses".to_string(), json!(contracts));
            },
            Msg::ExecuteContract { msg: execute_msg, .. } => {
                detail.insert("msg_json".to_string(), json!(execute_msg));
            },
            Msg::ClearAdmin { contract } => {
                records.push(
                    RecordKey::UpdateContractAdmin,
                    json!({
                        "contract": contract,
                        "admin": "",
                    }),
                );
            },
            Msg::UpdateAdmin {
                contract,
                new_admin,
            } => {
                records.push(
                    RecordKey::UpdateContractAdmin,
                    json!({
                        "contract": contract,
                        "admin": new_admin,
                    }),
                );
            },
            _ => {},
        }

        Ok(())
    }

    fn post_deliver_tx(
        &mut self,
        ctx: &Ctx,
        tx_hash: &TxHash,
        tx_dict: &mut JsDict,
        records: &mut Records,
    ) -> Result<()> {
        for contract in std::mem::take(&mut self.contract_txs) {
            records.push(
                RecordKey::NewContractTransaction,
                json!({
                    "contract_address": contract,
                    "tx_hash": tx_hash,
                    "is_instantiate": self.flags.is_instantiate,
                }),
            );
        }

        tx_dict.insert("is_store_code".to_string(), json!(self.flags.is_store_code));
        tx_dict.insert("is_instantiate".to_string(), json!(self.flags.is_instantiate));
        tx_dict.insert("is_execute".to_string(), json!(self.flags.is_execute));
        tx_dict.insert("is_update_admin".to_string(), json!(self.flags.is_update_admin));
        tx_dict.insert("is_clear_admin".to_string(), json!(self.flags.is_clear_admin));
        tx_dict.insert("is_migrate".to_string(), json!(self.flags.is_migrate));

        self.last_instance_id = self
            .wasm
            .peek_auto_increment_id(ctx, Sequence::LastInstanceId);

        Ok(())
    }

    fn after_end_block(
        &mut self,
        ctx: &Ctx,
        _req: &RequestEndBlock,
        ev_map: &EvMap,
        records: &mut Records,
    ) -> Result<()> {
        let Some(results) = ev_map.paired("active_proposal", "proposal_id", "proposal_result")?
        else {
            return Ok(());
        };

        for (proposal_id, result) in results {
            if result != PROPOSAL_PASSED {
                continue;
            }

            let proposal_id = proposal_id.parse::<u64>().map_err(|_| {
                HookError::Fatal(format!("proposal id `{proposal_id}` is not an integer"))
            })?;

            self.resolve_proposal(ctx, proposal_id, records)?;
        }

        Ok(())
    }
}

fn new_code(code_id: u64, uploader: &str, config: &AccessConfig) -> JsDict {
    let mut dict = JsDict::new();
    dict.insert("id".to_string(), json!(code_id));
    dict.insert("uploader".to_string(), json!(uploader));
    dict.insert("contract_instantiated".to_string(), json!(0));
    dict.insert(
        "access_config_permission".to_string(),
        json!(config.permission.to_string()),
    );
    dict.insert(
        "access_config_addresses".to_string(),
        json!(config.allowed_addresses()),
    );
    dict
}

fn contract_history(ctx: &Ctx, contract: &str, sender: &str, code_id: u64, remark: Json) -> Json {
    json!({
        "contract_address": contract,
        "sender": sender,
        "code_id": code_id,
        "block_height": ctx.block_height,
        "remark": remark,
    })
}

// ----------------------------------- tests -----------------------------------
