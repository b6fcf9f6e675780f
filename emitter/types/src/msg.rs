use serde_json::Value;

/// A message of a decoded transaction, or of a governance proposal.
#[derive(Debug, Clone, PartialEq)]
pub struct TxMsg {
    pub type_url: String,
    /// Bech32 addresses of the message's signers.
    pub signers: Vec<String>,
    /// The message in its JSON form, as the host's codec renders it.
    pub json: Value,
    pub kind: Msg,
}

impl TxMsg {
    pub fn new<T>(type_url: T, signers: Vec<String>, json: Value, kind: Msg) -> Self
    where
        T: Into<String>,
    {
        Self {
            type_url: type_url.into(),
            signers,
            json,
            kind,
        }
    }

    pub fn first_signer(&self) -> Option<&str> {
        self.signers.first().map(String::as_str)
    }
}

/// The messages the emitter reacts to. Everything else is [`Msg::Other`].
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    // bank
    Send,
    MultiSend,

    // staking and slashing
    CreateValidator {
        validator_address: String,
    },
    EditValidator {
        validator_address: String,
    },
    Delegate {
        validator_address: String,
    },
    Undelegate {
        validator_address: String,
    },
    BeginRedelegate {
        validator_src_address: String,
        validator_dst_address: String,
    },
    Unjail {
        validator_address: String,
    },

    // gov
    SubmitProposal,
    ExecLegacyContent {
        content: LegacyContent,
    },
    Deposit {
        proposal_id: u64,
    },
    Vote {
        proposal_id: u64,
    },
    VoteWeighted {
        proposal_id: u64,
    },

    // wasm
    StoreCode,
    InstantiateContract {
        code_id: u64,
    },
    InstantiateContract2 {
        code_id: u64,
    },
    ExecuteContract {
        contract: String,
        /// The raw JSON execute message.
        msg: String,
    },
    MigrateContract {
        contract: String,
        code_id: u64,
    },
    SudoContract {
        contract: String,
    },
    UpdateAdmin {
        contract: String,
        new_admin: String,
    },
    ClearAdmin {
        contract: String,
    },

    Ibc(IbcMsg),

    Other,
}

/// IBC core, fee middleware and transfer messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IbcMsg {
    RecvPacket { destination_port: String },
    Timeout { source_port: String },
    TimeoutOnClose { source_port: String },
    Acknowledgement { source_port: String },
    ChannelOpenInit { port_id: String },
    ChannelOpenTry { port_id: String },
    ChannelOpenAck { port_id: String },
    ChannelOpenConfirm { port_id: String },
    ChannelCloseInit { port_id: String },
    ChannelCloseConfirm { port_id: String },
    CreateClient,
    UpdateClient,
    UpgradeClient,
    SubmitMisbehaviour,
    ConnectionOpenInit,
    ConnectionOpenTry,
    ConnectionOpenAck,
    ConnectionOpenConfirm,
    RegisterPayee,
    RegisterCounterpartyPayee,
    PayPacketFee,
    PayPacketFeeAsync,
    Transfer,
}

impl IbcMsg {
    /// The local port whose owner executes this message, for the messages a
    /// contract bound to that port takes part in.
    pub fn contract_port(&self) -> Option<&str> {
        match self {
            IbcMsg::RecvPacket { destination_port } => Some(destination_port.as_str()),
            IbcMsg::Timeout { source_port } | IbcMsg::Acknowledgement { source_port } => {
                Some(source_port.as_str())
            },
            IbcMsg::ChannelOpenTry { port_id }
            | IbcMsg::ChannelOpenAck { port_id }
            | IbcMsg::ChannelOpenConfirm { port_id } => Some(port_id.as_str()),
            _ => None,
        }
    }
}

/// The content of a legacy (v1beta1) proposal wrapped in a v1 proposal.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyContent {
    pub proposal_type: String,
    pub proposal_route: String,
    pub title: String,
    pub description: String,
    /// The content in its JSON form.
    pub json: Value,
    pub kind: ContentKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    StoreCode,
    InstantiateContract { code_id: u64 },
    MigrateContract { contract: String, code_id: u64 },
    SudoContract { contract: String },
    ExecuteContract { contract: String },
    UpdateAdmin { contract: String, new_admin: String },
    ClearAdmin { contract: String },
    Other,
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, assertor::*};

    #[test]
    fn contract_ports_of_ibc_messages() {
        let recv = IbcMsg::RecvPacket {
            destination_port: "wasm.contract".to_string(),
        };
        let init = IbcMsg::ChannelOpenInit {
            port_id: "wasm.contract".to_string(),
        };

        assert_that!(recv.contract_port()).is_equal_to(Some("wasm.contract"));
        assert_that!(init.contract_port()).is_none();
        assert_that!(IbcMsg::Transfer.contract_port()).is_none();
    }
}
