use {
    crate::{HookError, Result},
    emitter_types::{json, Ctx, DecodedTx, JsDict, Json, ResponseDeliverTx, TxHash},
};

/// The value of the `NEW_TRANSACTION` record, before the per-message details
/// and the adapters' flags are added.
pub fn tx_dict(
    ctx: &Ctx,
    hash: &TxHash,
    tx: &DecodedTx,
    res: &ResponseDeliverTx,
) -> Result<JsDict> {
    let fee = tx.fee().ok_or_else(|| HookError::MissingFacet {
        hash: hash.to_string(),
        facet: "fee",
    })?;

    let memo = tx.memo().ok_or_else(|| HookError::MissingFacet {
        hash: hash.to_string(),
        facet: "memo",
    })?;

    let sender = tx
        .messages
        .first()
        .and_then(|msg| msg.first_signer())
        .ok_or_else(|| HookError::EmptyTx(hash.to_string()))?;

    let err_msg = (!res.is_ok()).then(|| res.log.clone());

    let mut dict = JsDict::new();
    dict.insert("hash".to_string(), json!(hash));
    dict.insert("block_height".to_string(), json!(ctx.block_height));
    dict.insert("gas_used".to_string(), json!(res.gas_used));
    dict.insert("gas_limit".to_string(), json!(fee.gas_limit));
    dict.insert("gas_fee".to_string(), json!(fee.amount.to_string()));
    dict.insert("err_msg".to_string(), json!(err_msg));
    dict.insert("sender".to_string(), json!(sender));
    dict.insert("success".to_string(), json!(res.is_ok()));
    dict.insert("memo".to_string(), json!(memo));

    Ok(dict)
}

/// The messages of an LCD `GetTxResponse`, found under `tx.body.messages`.
pub fn message_details(lcd: &Json) -> Result<Vec<JsDict>> {
    lcd.pointer("/tx/body/messages")
        .and_then(Json::as_array)
        .ok_or_else(|| HookError::Fatal("tx response has no tx.body.messages".to_string()))?
        .iter()
        .map(|msg| {
            msg.as_object()
                .cloned()
                .ok_or_else(|| HookError::Fatal("tx response message is not an object".to_string()))
        })
        .collect()
}

/// Put the (possibly stamped) message details back into the LCD response.
pub fn write_back_details(lcd: &mut Json, details: &[JsDict]) -> Result<()> {
    let messages = lcd
        .pointer_mut("/tx/body/messages")
        .and_then(Json::as_array_mut)
        .ok_or_else(|| HookError::Fatal("tx response has no tx.body.messages".to_string()))?;

    for (message, detail) in messages.iter_mut().zip(details) {
        *message = Json::Object(detail.clone());
    }

    Ok(())
}

// ----------------------------------- tests -----------------------------------
