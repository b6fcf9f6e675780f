use {
    crate::{Adapter, Result},
    emitter_types::{json, Ctx, EvMap, JsDict, Msg, Records, TxHash, TxMsg},
};

/// Flags transactions that touch IBC, either through an IBC message or by a
/// contract sending a packet.
#[derive(Debug, Default)]
pub struct IbcAdapter {
    is_ibc: bool,
}

impl IbcAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Adapter for IbcAdapter {
    fn pre_deliver_tx(&mut self) {
        self.is_ibc = false;
    }

    fn check_msg(&mut self, _ctx: &Ctx, msg: &TxMsg) {
        if matches!(msg.kind, Msg::Ibc(_)) {
            self.is_ibc = true;
        }
    }

    fn handle_msg_events(
        &mut self,
        _ctx: &Ctx,
        _tx_hash: &TxHash,
        _msg: &TxMsg,
        ev_map: &EvMap,
        _detail: &mut JsDict,
        _records: &mut Records,
    ) -> Result<()> {
        if ev_map.contains("send_packet", "packet_data") {
            self.is_ibc = true;
        }

        Ok(())
    }

    fn post_deliver_tx(
        &mut self,
        _ctx: &Ctx,
        _tx_hash: &TxHash,
        tx_dict: &mut JsDict,
        _records: &mut Records,
    ) -> Result<()> {
        tx_dict.insert("is_ibc".to_string(), json!(self.is_ibc));

        Ok(())
    }
}
