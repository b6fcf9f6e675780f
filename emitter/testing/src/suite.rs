use {
    crate::{codec, valcons_bytes, MockChain},
    chrono::{DateTime, Duration, TimeZone, Utc},
    emitter_hook::{Adapter, Hook},
    emitter_sink::{
        ClaimCheck, MemoryBlobStore, MemoryBus, RetryPolicy, RuntimeHandler, HEADER_HEIGHT,
        HEADER_INDEX, HEADER_TOTAL,
    },
    emitter_types::{
        json, Ctx, DecodedTx, Event, Fee, Json, RequestBeginBlock, RequestDeliverTx,
        RequestEndBlock, RequestInitChain, ResponseBeginBlock, ResponseDeliverTx,
        ResponseEndBlock, ResponseInitChain, TxHash, TxMsg,
    },
    std::{collections::BTreeMap, sync::Arc},
};

pub const CHAIN_ID: &str = "emitter-1";

// ----------------------------------- TestTx ----------------------------------

/// A transaction to deliver, together with the result the host reports.
#[derive(Debug, Clone)]
pub struct TestTx {
    msgs: Vec<TxMsg>,
    fee: Option<Fee>,
    memo: Option<String>,
    code: u32,
    failure_log: String,
    events: BTreeMap<usize, Vec<Event>>,
}

impl TestTx {
    pub fn new(msgs: Vec<TxMsg>) -> Self {
        Self {
            msgs,
            fee: Some(Fee {
                amount: "5000ustake".parse().unwrap(),
                gas_limit: 200_000,
            }),
            memo: Some(String::new()),
            code: 0,
            failure_log: String::new(),
            events: BTreeMap::new(),
        }
    }

    /// Set the events emitted by the message at `index`.
    pub fn with_events(mut self, index: usize, events: Vec<Event>) -> Self {
        self.events.insert(index, events);
        self
    }

    pub fn with_memo(mut self, memo: &str) -> Self {
        self.memo = Some(memo.to_string());
        self
    }

    /// Make the transaction fail with the given code and plain-text log.
    pub fn failed(mut self, code: u32, log: &str) -> Self {
        self.code = code;
        self.failure_log = log.to_string();
        self
    }

    pub fn without_fee(mut self) -> Self {
        self.fee = None;
        self
    }

    pub fn without_memo(mut self) -> Self {
        self.memo = None;
        self
    }

    /// The decoded transaction and the host's delivery result.
    pub fn into_parts(self) -> (DecodedTx, ResponseDeliverTx) {
        let log = if self.code == 0 {
            let logs = (0..self.msgs.len())
                .map(|index| {
                    json!({
                        "msg_index": index,
                        "log": "",
                        "events": self.events.get(&index).cloned().unwrap_or_default(),
                    })
                })
                .collect::<Vec<_>>();
            Json::Array(logs).to_string()
        } else {
            self.failure_log
        };

        let events = self.events.into_values().flatten().collect();
        let result = ResponseDeliverTx {
            code: self.code,
            codespace: if self.code == 0 { "" } else { "sdk" }.to_string(),
            log,
            data: Vec::new(),
            gas_wanted: 200_000,
            gas_used: 85_000,
            events,
        };

        let tx = DecodedTx {
            messages: self.msgs,
            fee: self.fee,
            memo: self.memo,
        };

        (tx, result)
    }
}

// --------------------------------- Published ---------------------------------

/// A bus message decoded back into its record.
#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub key: String,
    pub value: Json,
    pub index: usize,
    pub total: usize,
    pub height: u64,
}

// --------------------------------- TestSuite ---------------------------------

/// Drives a [`Hook`] through the block lifecycle against a [`MockChain`], an
/// in-memory bus and an in-memory blob store.
pub struct TestSuite {
    pub chain: MockChain,
    pub bus: MemoryBus,
    pub blobs: MemoryBlobStore,
    pub hook: Hook,
    pub genesis_time: DateTime<Utc>,
    /// The validator number, as in [`valcons`](crate::valcons), proposing
    /// every block.
    pub proposer: u8,
    ctx: Ctx,
    nonce: u64,
}

impl TestSuite {
    pub fn new(chain: MockChain) -> Self {
        Self::build(chain, |keepers, sink, runtime| {
            Hook::new(keepers, codec(), sink, runtime)
        })
    }

    /// A suite whose hook runs the given adapters instead of the standard
    /// ones.
    pub fn with_adapters(chain: MockChain, adapters: Vec<Box<dyn Adapter>>) -> Self {
        Self::build(chain, |keepers, sink, runtime| {
            Hook::with_adapters(keepers, codec(), adapters, sink, runtime)
        })
    }

    fn build<F>(chain: MockChain, make_hook: F) -> Self
    where
        F: FnOnce(emitter_types::Keepers, ClaimCheck, RuntimeHandler) -> Hook,
    {
        let bus = MemoryBus::new();
        let blobs = MemoryBlobStore::new();

        let sink = ClaimCheck::new(Arc::new(bus.clone()), Arc::new(blobs.clone())).with_retry(
            RetryPolicy {
                attempts: 5,
                backoff_unit: std::time::Duration::from_millis(1),
            },
        );
        let runtime = RuntimeHandler::new().unwrap();
        let hook = make_hook(chain.keepers(), sink, runtime);

        let genesis_time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        Self {
            chain,
            bus,
            blobs,
            hook,
            genesis_time,
            proposer: 1,
            ctx: Ctx::new(CHAIN_ID, 0, genesis_time),
            nonce: 0,
        }
    }

    /// The context of the block being processed.
    pub fn ctx(&self) -> &Ctx {
        &self.ctx
    }

    pub fn block_time(&self, height: u64) -> DateTime<Utc> {
        self.genesis_time + Duration::seconds(height as i64 * 5)
    }

    pub fn init_chain(&mut self, app_state: Json) -> emitter_hook::Result<()> {
        self.ctx = Ctx::new(CHAIN_ID, 0, self.genesis_time);

        let req = RequestInitChain {
            time: self.genesis_time,
            chain_id: CHAIN_ID.to_string(),
            app_state_bytes: app_state.to_string().into_bytes(),
            initial_height: 1,
        };

        self.hook
            .after_init_chain(&self.ctx, &req, &ResponseInitChain::default())
    }

    pub fn begin_block(&mut self, height: u64, events: Vec<Event>) -> emitter_hook::Result<()> {
        self.ctx = Ctx::new(CHAIN_ID, height, self.block_time(height));

        let req = RequestBeginBlock {
            hash: block_hash(height),
            header: emitter_types::Header {
                chain_id: CHAIN_ID.to_string(),
                height,
                time: self.ctx.block_time,
                proposer_address: valcons_bytes(self.proposer),
            },
        };

        self.hook
            .after_begin_block(&self.ctx, &req, &ResponseBeginBlock { events })
    }

    /// Deliver a transaction under fresh bytes and return its hash.
    pub fn deliver_tx(&mut self, tx: TestTx) -> emitter_hook::Result<TxHash> {
        self.nonce += 1;
        let bytes = format!("tx-{}", self.nonce).into_bytes();

        let (decoded, result) = tx.into_parts();
        self.chain.register_tx(bytes.clone(), decoded);

        let hash = TxHash::from_tx_bytes(&bytes);
        self.hook
            .after_deliver_tx(&self.ctx, &RequestDeliverTx { tx: bytes }, &result)?;

        Ok(hash)
    }

    pub fn end_block(&mut self, events: Vec<Event>) -> emitter_hook::Result<()> {
        let req = RequestEndBlock {
            height: self.ctx.block_height,
        };

        self.hook
            .after_end_block(&self.ctx, &req, &ResponseEndBlock { events })
    }

    pub fn commit(&mut self) -> emitter_hook::Result<()> {
        self.hook.before_commit()
    }

    /// Run a whole block without begin or end block events and return the
    /// hashes of its transactions.
    pub fn make_block(
        &mut self,
        height: u64,
        txs: Vec<TestTx>,
    ) -> emitter_hook::Result<Vec<TxHash>> {
        self.begin_block(height, Vec::new())?;

        let hashes = txs
            .into_iter()
            .map(|tx| self.deliver_tx(tx))
            .collect::<emitter_hook::Result<Vec<_>>>()?;

        self.end_block(Vec::new())?;
        self.commit()?;

        Ok(hashes)
    }

    /// The records of the last published batch.
    pub fn published(&self) -> Vec<Published> {
        self.bus
            .last_batch()
            .unwrap()
            .unwrap_or_default()
            .iter()
            .map(|message| Published {
                key: message.key.clone(),
                value: message.value_json().unwrap(),
                index: message.header(HEADER_INDEX).unwrap().parse().unwrap(),
                total: message.header(HEADER_TOTAL).unwrap().parse().unwrap(),
                height: message.header(HEADER_HEIGHT).unwrap().parse().unwrap(),
            })
            .collect()
    }

    pub fn published_keys(&self) -> Vec<String> {
        self.published()
            .into_iter()
            .map(|published| published.key)
            .collect()
    }

    /// Values of the last batch's records under `key`, in order.
    pub fn published_values(&self, key: &str) -> Vec<Json> {
        self.published()
            .into_iter()
            .filter(|published| published.key == key)
            .map(|published| published.value)
            .collect()
    }
}

/// A 32-byte block hash derived from the height.
pub fn block_hash(height: u64) -> Vec<u8> {
    height.to_be_bytes().repeat(4)
}
