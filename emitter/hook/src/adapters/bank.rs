use {
    crate::{Adapter, Result},
    emitter_types::{json, Ctx, JsDict, Msg, Records, TxHash, TxMsg},
};

/// Flags transactions that move funds with the bank module.
#[derive(Debug, Default)]
pub struct BankAdapter {
    is_send: bool,
}

impl BankAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Adapter for BankAdapter {
    fn pre_deliver_tx(&mut self) {
        self.is_send = false;
    }

    fn check_msg(&mut self, _ctx: &Ctx, msg: &TxMsg) {
        if matches!(msg.kind, Msg::Send | Msg::MultiSend) {
            self.is_send = true;
        }
    }

    fn post_deliver_tx(
        &mut self,
        _ctx: &Ctx,
        _tx_hash: &TxHash,
        tx_dict: &mut JsDict,
        _records: &mut Records,
    ) -> Result<()> {
        tx_dict.insert("is_send".to_string(), json!(self.is_send));

        Ok(())
    }
}
