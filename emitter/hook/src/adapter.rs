use {
    crate::{Genesis, Result},
    emitter_types::{
        Ctx, EvMap, JsDict, Records, RequestBeginBlock, RequestEndBlock, TxHash, TxMsg,
    },
};

/// A per-domain extractor driven by the [`Hook`](crate::Hook) at every
/// lifecycle point.
///
/// Adapters append to the block's record buffer through the handle they are
/// given and keep their own per-transaction and per-block state. They never
/// see each other.
pub trait Adapter: Send {
    /// Returns a name for this adapter, used for logging and debugging.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn after_init_chain(
        &mut self,
        _ctx: &Ctx,
        _genesis: &Genesis,
        _records: &mut Records,
    ) -> Result<()> {
        Ok(())
    }

    fn after_begin_block(
        &mut self,
        _ctx: &Ctx,
        _req: &RequestBeginBlock,
        _ev_map: &EvMap,
        _records: &mut Records,
    ) -> Result<()> {
        Ok(())
    }

    /// Reset per-transaction state.
    fn pre_deliver_tx(&mut self) {}

    /// Inspect a message of the transaction being delivered, successful or
    /// not.
    fn check_msg(&mut self, _ctx: &Ctx, _msg: &TxMsg) {}

    /// Called for each message of a successful transaction, with the events
    /// that message emitted. `detail` is the message's entry in the LCD
    /// result and may be stamped with extra fields.
    fn handle_msg_events(
        &mut self,
        _ctx: &Ctx,
        _tx_hash: &TxHash,
        _msg: &TxMsg,
        _ev_map: &EvMap,
        _detail: &mut JsDict,
        _records: &mut Records,
    ) -> Result<()> {
        Ok(())
    }

    /// Called once the transaction is fully processed. `tx_dict` is the value
    /// of its `NEW_TRANSACTION` record, still open for per-transaction flags.
    fn post_deliver_tx(
        &mut self,
        _ctx: &Ctx,
        _tx_hash: &TxHash,
        _tx_dict: &mut JsDict,
        _records: &mut Records,
    ) -> Result<()> {
        Ok(())
    }

    fn after_end_block(
        &mut self,
        _ctx: &Ctx,
        _req: &RequestEndBlock,
        _ev_map: &EvMap,
        _records: &mut Records,
    ) -> Result<()> {
        Ok(())
    }
}
