use emitter_types::{json, Coins, ContentKind, IbcMsg, Json, LegacyContent, Msg, TxMsg};

fn coins(amount: &str) -> Coins {
    amount.parse().unwrap()
}

fn msg(type_url: &str, signer: &str, mut json: Json, kind: Msg) -> TxMsg {
    if let Json::Object(map) = &mut json {
        map.insert("@type".to_string(), json!(type_url));
    }

    TxMsg::new(type_url, vec![signer.to_string()], json, kind)
}

// ----------------------------------- bank ------------------------------------

pub fn send(from: &str, to: &str, amount: &str) -> TxMsg {
    msg(
        "/cosmos.bank.v1beta1.MsgSend",
        from,
        json!({
            "from_address": from,
            "to_address": to,
            "amount": coins(amount),
        }),
        Msg::Send,
    )
}

// ---------------------------------- staking ----------------------------------

pub fn create_validator(delegator: &str, validator: &str) -> TxMsg {
    msg(
        "/cosmos.staking.v1beta1.MsgCreateValidator",
        delegator,
        json!({
            "delegator_address": delegator,
            "validator_address": validator,
        }),
        Msg::CreateValidator {
            validator_address: validator.to_string(),
        },
    )
}

pub fn delegate(delegator: &str, validator: &str, amount: &str) -> TxMsg {
    msg(
        "/cosmos.staking.v1beta1.MsgDelegate",
        delegator,
        json!({
            "delegator_address": delegator,
            "validator_address": validator,
            "amount": coins(amount),
        }),
        Msg::Delegate {
            validator_address: validator.to_string(),
        },
    )
}

pub fn begin_redelegate(delegator: &str, src: &str, dst: &str) -> TxMsg {
    msg(
        "/cosmos.staking.v1beta1.MsgBeginRedelegate",
        delegator,
        json!({
            "delegator_address": delegator,
            "validator_src_address": src,
            "validator_dst_address": dst,
        }),
        Msg::BeginRedelegate {
            validator_src_address: src.to_string(),
            validator_dst_address: dst.to_string(),
        },
    )
}

// ------------------------------------ gov ------------------------------------

pub fn submit_proposal(proposer: &str, messages: &[TxMsg]) -> TxMsg {
    let messages = messages.iter().map(|msg| msg.json.clone()).collect::<Vec<_>>();

    msg(
        "/cosmos.gov.v1.MsgSubmitProposal",
        proposer,
        json!({
            "messages": messages,
            "proposer": proposer,
        }),
        Msg::SubmitProposal,
    )
}

pub fn deposit(depositor: &str, proposal_id: u64, amount: &str) -> TxMsg {
    msg(
        "/cosmos.gov.v1.MsgDeposit",
        depositor,
        json!({
            "proposal_id": proposal_id.to_string(),
            "depositor": depositor,
            "amount": coins(amount),
        }),
        Msg::Deposit { proposal_id },
    )
}

pub fn vote_weighted(voter: &str, proposal_id: u64, options: &[(u8, &str)]) -> TxMsg {
    let options = options
        .iter()
        .map(|(option, weight)| json!({ "option": option, "weight": weight }))
        .collect::<Vec<_>>();

    msg(
        "/cosmos.gov.v1.MsgVoteWeighted",
        voter,
        json!({
            "proposal_id": proposal_id.to_string(),
            "voter": voter,
            "options": options,
        }),
        Msg::VoteWeighted { proposal_id },
    )
}

/// The `proposal_vote.option` attribute of a vote, one line per option.
pub fn vote_option_attribute(options: &[(u8, &str)]) -> String {
    options
        .iter()
        .map(|(option, weight)| format!("option:{option} weight:{weight}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A v1 proposal message wrapping legacy content.
pub fn legacy_content(authority: &str, title: &str, kind: ContentKind) -> TxMsg {
    let content = json!({
        "title": title,
        "description": format!("{title} description"),
    });
    let proposal_route = match kind {
        ContentKind::Text => "gov",
        _ => "wasm",
    };

    msg(
        "/cosmos.gov.v1.MsgExecLegacyContent",
        authority,
        json!({
            "content": content,
            "authority": authority,
        }),
        Msg::ExecLegacyContent {
            content: LegacyContent {
                proposal_type: legacy_type(&kind).to_string(),
                proposal_route: proposal_route.to_string(),
                title: title.to_string(),
                description: format!("{title} description"),
                json: content,
                kind,
            },
        },
    )
}

fn legacy_type(kind: &ContentKind) -> &'static str {
    match kind {
        ContentKind::Text => "Text",
        ContentKind::StoreCode => "StoreCode",
        ContentKind::InstantiateContract { .. } => "InstantiateContract",
        ContentKind::MigrateContract { .. } => "MigrateContract",
        ContentKind::SudoContract { .. } => "SudoContract",
        ContentKind::ExecuteContract { .. } => "ExecuteContract",
        ContentKind::UpdateAdmin { .. } => "UpdateAdmin",
        ContentKind::ClearAdmin { .. } => "ClearAdmin",
        ContentKind::Other => "",
    }
}

// ------------------------------------ wasm -----------------------------------

pub fn store_code(sender: &str) -> TxMsg {
    msg(
        "/cosmwasm.wasm.v1.MsgStoreCode",
        sender,
        json!({
            "sender": sender,
            "wasm_byte_code": "AGFzbQEAAAA=",
        }),
        Msg::StoreCode,
    )
}

pub fn instantiate(sender: &str, code_id: u64, label: &str, init_msg: Json) -> TxMsg {
    msg(
        "/cosmwasm.wasm.v1.MsgInstantiateContract",
        sender,
        json!({
            "sender": sender,
            "code_id": code_id.to_string(),
            "label": label,
            "msg": init_msg,
        }),
        Msg::InstantiateContract { code_id },
    )
}

pub fn instantiate2(sender: &str, code_id: u64, label: &str, init_msg: Json) -> TxMsg {
    msg(
        "/cosmwasm.wasm.v1.MsgInstantiateContract2",
        sender,
        json!({
            "sender": sender,
            "code_id": code_id.to_string(),
            "label": label,
            "msg": init_msg,
        }),
        Msg::InstantiateContract2 { code_id },
    )
}

pub fn execute(sender: &str, contract: &str, execute_msg: Json) -> TxMsg {
    msg(
        "/cosmwasm.wasm.v1.MsgExecuteContract",
        sender,
        json!({
            "sender": sender,
            "contract": contract,
            "msg": execute_msg,
        }),
        Msg::ExecuteContract {
            contract: contract.to_string(),
            msg: execute_msg.to_string(),
        },
    )
}

pub fn migrate(sender: &str, contract: &str, code_id: u64) -> TxMsg {
    msg(
        "/cosmwasm.wasm.v1.MsgMigrateContract",
        sender,
        json!({
            "sender": sender,
            "contract": contract,
            "code_id": code_id.to_string(),
        }),
        Msg::MigrateContract {
            contract: contract.to_string(),
            code_id,
        },
    )
}

pub fn update_admin(sender: &str, contract: &str, new_admin: &str) -> TxMsg {
    msg(
        "/cosmwasm.wasm.v1.MsgUpdateAdmin",
        sender,
        json!({
            "sender": sender,
            "contract": contract,
            "new_admin": new_admin,
        }),
        Msg::UpdateAdmin {
            contract: contract.to_string(),
            new_admin: new_admin.to_string(),
        },
    )
}

// ------------------------------------ ibc ------------------------------------

pub fn recv_packet(signer: &str, destination_port: &str) -> TxMsg {
    msg(
        "/ibc.core.channel.v1.MsgRecvPacket",
        signer,
        json!({
            "packet": { "destination_port": destination_port },
            "signer": signer,
        }),
        Msg::Ibc(IbcMsg::RecvPacket {
            destination_port: destination_port.to_string(),
        }),
    )
}
