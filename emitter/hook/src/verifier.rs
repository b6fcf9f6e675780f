use {
    emitter_types::{json, AccountKeeper, AccountKind, AuthAccount, Ctx, JsDict, WasmKeeper},
    std::sync::Arc,
};

/// Decides whether an address is an account of a given family, and if so
/// describes it.
pub trait AccountVerifier: Send + Sync {
    fn verify(&self, ctx: &Ctx, address: &str) -> Option<JsDict>;
}

/// Claims addresses that hold a contract.
pub struct ContractAccountVerifier {
    wasm: Arc<dyn WasmKeeper>,
}

impl ContractAccountVerifier {
    pub fn new(wasm: Arc<dyn WasmKeeper>) -> Self {
        Self { wasm }
    }
}

impl AccountVerifier for ContractAccountVerifier {
    fn verify(&self, ctx: &Ctx, address: &str) -> Option<JsDict> {
        self.wasm
            .contract_info(ctx, address)
            .map(|_| account_dict(address, AccountKind::Contract))
    }
}

/// Claims any address the account keeper knows about.
pub struct AuthAccountVerifier {
    accounts: Arc<dyn AccountKeeper>,
}

impl AuthAccountVerifier {
    pub fn new(accounts: Arc<dyn AccountKeeper>) -> Self {
        Self { accounts }
    }
}

impl AccountVerifier for AuthAccountVerifier {
    fn verify(&self, ctx: &Ctx, address: &str) -> Option<JsDict> {
        let account = self.accounts.account(ctx, address)?;

        let kind = match &account {
            AuthAccount::Module { name } => {
                let mut dict = account_dict(address, AccountKind::Module);
                dict.insert("name".to_string(), json!(name));
                return Some(dict);
            },
            AuthAccount::Interchain => AccountKind::Interchain,
            AuthAccount::ContinuousVesting => AccountKind::ContinuousVesting,
            AuthAccount::DelayedVesting => AccountKind::DelayedVesting,
            AuthAccount::PermanentLocked => AccountKind::PermanentLocked,
            AuthAccount::BaseVesting => AccountKind::BaseVesting,
            // Not part of the recognized vesting kinds: reported as plain accounts.
            AuthAccount::PeriodicVesting | AuthAccount::ClawbackVesting | AuthAccount::Base => {
                AccountKind::Base
            },
        };

        Some(account_dict(address, kind))
    }
}

/// Describe an address with the first verifier that claims it. An address no
/// verifier claims is described without a type.
pub fn classify(ctx: &Ctx, address: &str, verifiers: &[Box<dyn AccountVerifier>]) -> JsDict {
    verifiers
        .iter()
        .find_map(|verifier| verifier.verify(ctx, address))
        .unwrap_or_else(|| {
            let mut dict = JsDict::new();
            dict.insert("address".to_string(), json!(address));
            dict
        })
}

fn account_dict(address: &str, kind: AccountKind) -> JsDict {
    let mut dict = JsDict::new();
    dict.insert("address".to_string(), json!(address));
    dict.insert("type".to_string(), json!(kind.ordinal()));
    dict
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {
        super::*,
        assert_json_diff::assert_json_eq,
        emitter_types::{CodeInfo, ContractCodeHistoryEntry, ContractInfo, Json, Sequence},
        std::collections::BTreeMap,
        test_case::test_case,
    };

    #[derive(Default)]
    struct Keeper {
        contracts: BTreeMap<String, ContractInfo>,
        accounts: BTreeMap<String, AuthAccount>,
    }

    impl WasmKeeper for Keeper {
        fn contract_info(&self, _ctx: &Ctx, contract: &str) -> Option<ContractInfo> {
            self.contracts.get(contract).cloned()
        }

        fn contract_infos(&self, _ctx: &Ctx) -> Vec<(String, ContractInfo)> {
            Vec::new()
        }

        fn code_info(&self, _ctx: &Ctx, _code_id: u64) -> Option<CodeInfo> {
            None
        }

        fn contract_history(&self, _ctx: &Ctx, _contract: &str) -> Vec<ContractCodeHistoryEntry> {
            Vec::new()
        }

        fn query_raw(&self, _ctx: &Ctx, _contract: &str, _key: &[u8]) -> Option<Vec<u8>> {
            None
        }

        fn peek_auto_increment_id(&self, _ctx: &Ctx, _sequence: Sequence) -> u64 {
            1
        }
    }

    impl AccountKeeper for Keeper {
        fn account(&self, _ctx: &Ctx, address: &str) -> Option<AuthAccount> {
            self.accounts.get(address).cloned()
        }
    }

    fn verifiers(keeper: Keeper) -> Vec<Box<dyn AccountVerifier>> {
        let keeper = Arc::new(keeper);
        vec![
            Box::new(ContractAccountVerifier::new(keeper.clone())),
            Box::new(AuthAccountVerifier::new(keeper)),
        ]
    }

    #[test]
    fn contract_wins_over_auth() {
        let mut keeper = Keeper::default();
        keeper.contracts.insert("c".to_string(), ContractInfo::default());
        keeper.accounts.insert("c".to_string(), AuthAccount::Base);

        let dict = classify(&Ctx::default(), "c", &verifiers(keeper));

        assert_json_eq!(Json::Object(dict), json!({ "address": "c", "type": 6 }));
    }

    #[test]
    fn module_accounts_carry_their_name() {
        let mut keeper = Keeper::default();
        keeper.accounts.insert("m".to_string(), AuthAccount::Module {
            name: "gov".to_string(),
        });

        let dict = classify(&Ctx::default(), "m", &verifiers(keeper));

        assert_json_eq!(Json::Object(dict), json!({ "address": "m", "type": 2, "name": "gov" }));
    }

    #[test_case(AuthAccount::Base, 0; "base")]
    #[test_case(AuthAccount::Interchain, 1; "interchain")]
    #[test_case(AuthAccount::ContinuousVesting, 3; "continuous vesting")]
    #[test_case(AuthAccount::DelayedVesting, 4; "delayed vesting")]
    #[test_case(AuthAccount::PeriodicVesting, 0; "periodic vesting")]
    #[test_case(AuthAccount::ClawbackVesting, 0; "clawback vesting")]
    #[test_case(AuthAccount::PermanentLocked, 8; "permanent locked")]
    #[test_case(AuthAccount::BaseVesting, 9; "base vesting")]
    fn auth_account_kinds(account: AuthAccount, kind: i32) {
        let mut keeper = Keeper::default();
        keeper.accounts.insert("a".to_string(), account);

        let dict = classify(&Ctx::default(), "a", &verifiers(keeper));

        assert_json_eq!(Json::Object(dict), json!({ "address": "a", "type": kind }));
    }

    #[test]
    fn unknown_address_has_no_type() {
        let dict = classify(&Ctx::default(), "nobody", &verifiers(Keeper::default()));

        assert_json_eq!(Json::Object(dict), json!({ "address": "nobody" }));
    }
}
