use {
    crate::{Adapter, Genesis, Result},
    emitter_types::{
        base64_bytes, json, unix_nanos, Bech32Codec, Ctx, EvMap, JsDict, Msg, RecordKey, Records,
        RequestBeginBlock, RequestEndBlock, StakingKeeper, TxHash, TxMsg, Validator,
    },
    std::sync::Arc,
};

/// Emits blocks and keeps validators up to date.
pub struct ValidatorAdapter {
    staking: Arc<dyn StakingKeeper>,
    codec: Bech32Codec,
}

impl ValidatorAdapter {
    pub fn new(staking: Arc<dyn StakingKeeper>, codec: Bech32Codec) -> Self {
        Self { staking, codec }
    }

    /// Re-read a validator and emit its full state. A validator the keeper
    /// doesn't know is emitted with default values.
    fn emit_set_validator(
        &self,
        ctx: &Ctx,
        operator_address: &str,
        records: &mut Records,
    ) -> Validator {
        let validator = self
            .staking
            .validator(ctx, operator_address)
            .unwrap_or_default();

        let delegator_address = self
            .codec
            .validator_to_account(operator_address)
            .unwrap_or_default();

        records.push(
            RecordKey::SetValidator,
            json!({
                "operator_address": operator_address,
                "delegator_address": delegator_address,
                "consensus_address": validator.consensus_address,
                "moniker": validator.description.moniker,
                "identity": validator.description.identity,
                "website": validator.description.website,
                "details": validator.description.details,
                "commission_rate": validator.commission.rate,
                "commission_max_rate": validator.commission.max_rate,
                "commission_max_change": validator.commission.max_change_rate,
                "min_self_delegation": validator.min_self_delegation,
                "jailed": validator.jailed,
            }),
        );

        validator
    }

    fn handle_jailed_events(&self, ctx: &Ctx, ev_map: &EvMap, records: &mut Records) {
        for consensus_address in ev_map.get("slash", "jailed").unwrap_or_default() {
            let validator = self
                .staking
                .validator_by_cons_addr(ctx, consensus_address)
                .unwrap_or_default();

            records.push(
                RecordKey::UpdateValidator,
                json!({
                    "operator_address": validator.operator_address,
                    "jailed": validator.jailed,
                }),
            );
        }
    }
}

impl Adapter for ValidatorAdapter {
    fn after_init_chain(
        &mut self,
        ctx: &Ctx,
        genesis: &Genesis,
        records: &mut Records,
    ) -> Result<()> {
        for tx in &genesis.gen_txs {
            for msg in &tx.messages {
                if let Msg::CreateValidator { validator_address } = &msg.kind {
                    self.emit_set_validator(ctx, validator_address, records);
                }
            }
        }

        Ok(())
    }

    fn after_begin_block(
        &mut self,
        ctx: &Ctx,
        req: &RequestBeginBlock,
        ev_map: &EvMap,
        records: &mut Records,
    ) -> Result<()> {
        let proposer = self
            .codec
            .encode_consensus(&req.header.proposer_address)
            .ok()
            .and_then(|address| self.staking.validator_by_cons_addr(ctx, &address))
            .map(|validator| validator.operator_address)
            .unwrap_or_default();

        records.push(
            RecordKey::NewBlock,
            json!({
                "height": req.header.height,
                "timestamp": unix_nanos(&ctx.block_time),
                "proposer": proposer,
                "hash": base64_bytes(&req.hash),
            }),
        );

        self.handle_jailed_events(ctx, ev_map, records);

        Ok(())
    }

    fn handle_msg_events(
        &mut self,
        ctx: &Ctx,
        _tx_hash: &TxHash,
        msg: &TxMsg,
        _ev_map: &EvMap,
        detail: &mut JsDict,
        records: &mut Records,
    ) -> Result<()> {
        match &msg.kind {
            Msg::CreateValidator { validator_address }
            | Msg::EditValidator { validator_address }
            | Msg::Delegate { validator_address }
            | Msg::Undelegate { validator_address }
            | Msg::Unjail { validator_address } => {
                let validator = self.emit_set_validator(ctx, validator_address, records);
                detail.insert("moniker".to_string(), json!(validator.description.moniker));
                detail.insert("identity".to_string(), json!(validator.description.identity));
            },
            Msg::BeginRedelegate {
                validator_src_address,
                validator_dst_address,
            } => {
                let src = self
                    .staking
                    .validator(ctx, validator_src_address)
                    .unwrap_or_default();
                let dst = self
                    .staking
                    .validator(ctx, validator_dst_address)
                    .unwrap_or_default();

                detail.insert("src_moniker".to_string(), json!(src.description.moniker));
                detail.insert("src_identity".to_string(), json!(src.description.identity));
                detail.insert("dst_moniker".to_string(), json!(dst.description.moniker));
                detail.insert("dst_identity".to_string(), json!(dst.description.identity));
            },
            _ => {},
        }

        Ok(())
    }

    fn after_end_block(
        &mut self,
        ctx: &Ctx,
        _req: &RequestEndBlock,
        ev_map: &EvMap,
        records: &mut Records,
    ) -> Result<()> {
        self.handle_jailed_events(ctx, ev_map, records);

        Ok(())
    }
}
