use {
    crate::{
        adapters::{BankAdapter, GovAdapter, IbcAdapter, ValidatorAdapter, WasmAdapter},
        bail, classify, collect_accounts, message_details, tx_dict, write_back_details, Adapter,
        AccountVerifier, AuthAccountVerifier, ContractAccountVerifier, Genesis, HookError, Result,
    },
    emitter_sink::{ClaimCheck, RuntimeHandler},
    emitter_types::{
        json, parse_abci_logs, rfc3339, Bech32Codec, Ctx, EvMap, Json, Keepers, Record,
        RecordKey, Records, RequestBeginBlock, RequestDeliverTx, RequestEndBlock,
        RequestInitChain, ResponseBeginBlock, ResponseDeliverTx, ResponseEndBlock,
        ResponseInitChain, TxHash, TxResultEnvelope,
    },
    std::collections::BTreeSet,
};

/// Turns the host's block lifecycle into an ordered stream of records, one
/// batch per block.
///
/// The host drives it with the five lifecycle callbacks, in order, from a
/// single thread. Any error is fatal: the host is expected to halt and replay
/// the block after a restart, so downstream must tolerate duplicates.
pub struct Hook {
    keepers: Keepers,
    codec: Bech32Codec,
    adapters: Vec<Box<dyn Adapter>>,
    verifiers: Vec<Box<dyn AccountVerifier>>,
    sink: ClaimCheck,
    runtime: RuntimeHandler,
    accs_in_block: BTreeSet<String>,
    accs_in_tx: BTreeSet<String>,
    records: Records,
    height: u64,
}

impl Hook {
    /// A hook with the standard adapters, in their fixed order: validator,
    /// bank, IBC, governance, contract VM.
    pub fn new(
        keepers: Keepers,
        codec: Bech32Codec,
        sink: ClaimCheck,
        runtime: RuntimeHandler,
    ) -> Self {
        let adapters: Vec<Box<dyn Adapter>> = vec![
            Box::new(ValidatorAdapter::new(keepers.staking.clone(), codec.clone())),
            Box::new(BankAdapter::new()),
            Box::new(IbcAdapter::new()),
            Box::new(GovAdapter::new(
                keepers.gov.clone(),
                keepers.staking.clone(),
                codec.clone(),
            )),
            Box::new(WasmAdapter::new(
                keepers.wasm.clone(),
                keepers.gov.clone(),
                codec.clone(),
            )),
        ];

        Self::with_adapters(keepers, codec, adapters, sink, runtime)
    }

    /// A hook with a custom adapter list, invoked in the given order.
    pub fn with_adapters(
        keepers: Keepers,
        codec: Bech32Codec,
        adapters: Vec<Box<dyn Adapter>>,
        sink: ClaimCheck,
        runtime: RuntimeHandler,
    ) -> Self {
        let verifiers: Vec<Box<dyn AccountVerifier>> = vec![
            Box::new(ContractAccountVerifier::new(keepers.wasm.clone())),
            Box::new(AuthAccountVerifier::new(keepers.account.clone())),
        ];

        Self {
            keepers,
            codec,
            adapters,
            verifiers,
            sink,
            runtime,
            accs_in_block: BTreeSet::new(),
            accs_in_tx: BTreeSet::new(),
            records: Records::new(),
            height: 0,
        }
    }

    /// The records buffered for the current block.
    pub fn records(&self) -> &Records {
        &self.records
    }

    /// The height of the last ended block.
    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn after_init_chain(
        &mut self,
        ctx: &Ctx,
        req: &RequestInitChain,
        _res: &ResponseInitChain,
    ) -> Result<()> {
        let genesis = Genesis::parse(&req.app_state_bytes, self.keepers.codec.as_ref())?;

        for account in &genesis.accounts {
            let dict = classify(ctx, &account.address, &self.verifiers);
            self.records.push(RecordKey::SetAccount, Json::Object(dict));
        }

        each_adapter(&mut self.adapters, "after_init_chain", |adapter| {
            adapter.after_init_chain(ctx, &genesis, &mut self.records)
        })?;

        self.records.push(RecordKey::Commit, json!({ "height": 0 }));
        self.height = 0;

        self.flush()
    }

    pub fn after_begin_block(
        &mut self,
        ctx: &Ctx,
        req: &RequestBeginBlock,
        res: &ResponseBeginBlock,
    ) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::debug!(block_height = req.header.height, "Beginning block");

        self.accs_in_block.clear();
        self.accs_in_tx.clear();
        self.records = Records::new();

        let ev_map = EvMap::from_events(&res.events);
        each_adapter(&mut self.adapters, "after_begin_block", |adapter| {
            adapter.after_begin_block(ctx, req, &ev_map, &mut self.records)
        })?;

        Ok(())
    }

    pub fn after_deliver_tx(
        &mut self,
        ctx: &Ctx,
        req: &RequestDeliverTx,
        res: &ResponseDeliverTx,
    ) -> Result<()> {
        // Genesis transactions are reported by `after_init_chain`.
        if ctx.block_height == 0 {
            return Ok(());
        }

        self.accs_in_tx.clear();
        for adapter in &mut self.adapters {
            adapter.pre_deliver_tx();
        }

        let hash = TxHash::from_tx_bytes(&req.tx);
        let tx = self.keepers.codec.decode_tx(&req.tx)?;
        let mut tx_dict = tx_dict(ctx, &hash, &tx, res)?;

        let tx_slot = self.records.reserve(RecordKey::NewTransaction);
        let lcd_slot = self.records.reserve(RecordKey::InsertLcdTxResults);

        let mut lcd = self.keepers.codec.tx_response_json(&TxResultEnvelope {
            hash,
            height: ctx.block_height,
            tx: &req.tx,
            result: res,
            timestamp: rfc3339(&ctx.block_time),
        })?;

        let mut details = message_details(&lcd)?;
        if details.len() != tx.messages.len() {
            bail!(
                "transaction {hash} has {} messages but its tx response has {}",
                tx.messages.len(),
                details.len()
            );
        }

        let logs = if res.is_ok() {
            parse_abci_logs(&res.log)?
        } else {
            Vec::new()
        };

        for (index, (msg, detail)) in tx.messages.iter().zip(&mut details).enumerate() {
            for adapter in &mut self.adapters {
                adapter.check_msg(ctx, msg);
            }

            collect_accounts(&self.codec, &msg.json, &mut self.accs_in_tx);

            if !res.is_ok() {
                continue;
            }

            let log = logs.get(index).ok_or_else(|| HookError::MissingMessageLog {
                hash: hash.to_string(),
                index,
            })?;

            let ev_map = EvMap::from_events(&log.events);
            for value in ev_map.values() {
                if self.codec.is_account(value) {
                    self.accs_in_tx.insert(value.to_string());
                }
            }

            each_adapter(&mut self.adapters, "handle_msg_events", |adapter| {
                adapter.handle_msg_events(ctx, &hash, msg, &ev_map, detail, &mut self.records)
            })?;
        }

        write_back_details(&mut lcd, &details)?;
        self.records.fill(
            lcd_slot,
            json!({
                "tx_hash": hash,
                "block_height": ctx.block_height,
                "result": lcd,
            }),
        );

        let signers = tx.signers().unwrap_or_default().to_vec();
        self.accs_in_tx.extend(signers.iter().cloned());
        self.accs_in_block.extend(self.accs_in_tx.iter().cloned());
        self.records.push(
            RecordKey::SetRelatedTransaction,
            json!({
                "hash": hash,
                "block_height": ctx.block_height,
                "signer": signers,
                "related_accounts": self.accs_in_tx,
            }),
        );

        let messages = tx
            .messages
            .iter()
            .zip(details)
            .map(|(msg, detail)| {
                json!({
                    "detail": detail,
                    "type": msg.type_url,
                })
            })
            .collect::<Vec<_>>();
        tx_dict.insert("messages".to_string(), Json::Array(messages));

        each_adapter(&mut self.adapters, "post_deliver_tx", |adapter| {
            adapter.post_deliver_tx(ctx, &hash, &mut tx_dict, &mut self.records)
        })?;

        self.records.fill(tx_slot, Json::Object(tx_dict));

        Ok(())
    }

    pub fn after_end_block(
        &mut self,
        ctx: &Ctx,
        req: &RequestEndBlock,
        res: &ResponseEndBlock,
    ) -> Result<()> {
        let ev_map = EvMap::from_events(&res.events);
        each_adapter(&mut self.adapters, "after_end_block", |adapter| {
            adapter.after_end_block(ctx, req, &ev_map, &mut self.records)
        })?;

        if self.records.first().map(|record| record.key) != Some(RecordKey::NewBlock) {
            return Err(HookError::MissingNewBlock);
        }

        let accounts = self
            .accs_in_block
            .iter()
            .map(|address| {
                let dict = classify(ctx, address, &self.verifiers);
                Record::new(RecordKey::SetAccount, Json::Object(dict))
            })
            .collect::<Vec<_>>();
        self.records.insert_after_first(accounts);

        self.height = req.height;
        self.records
            .push(RecordKey::Commit, json!({ "height": req.height }));

        Ok(())
    }

    pub fn before_commit(&mut self) -> Result<()> {
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        let records = self.records.drain();
        let height = self.height;

        let _total = self.runtime.block_on(self.sink.flush(height, records))?;

        #[cfg(feature = "tracing")]
        tracing::info!(block_height = height, total = _total, "Flushed block");

        Ok(())
    }
}

/// Run a fallible hook on every adapter in order, stopping at the first error.
fn each_adapter<F>(adapters: &mut [Box<dyn Adapter>], _stage: &'static str, mut f: F) -> Result<()>
where
    F: FnMut(&mut dyn Adapter) -> Result<()>,
{
    for adapter in adapters {
        f(adapter.as_mut()).inspect_err(|_err| {
            #[cfg(feature = "tracing")]
            tracing::error!(
                adapter = adapter.name(),
                stage = _stage,
                err = %_err,
                "Adapter failed"
            );
        })?;
    }

    Ok(())
}
