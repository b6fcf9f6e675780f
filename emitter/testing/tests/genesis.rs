use {
    assert_json_diff::{assert_json_eq, assert_json_include},
    assertor::*,
    emitter_hook::HookError,
    emitter_testing::{addr, valoper, MockChain, TestSuite},
    emitter_types::{json, AuthAccount, CodeInfo, Json},
};

fn app_state() -> Json {
    json!({
        "auth": {
            "accounts": [
                {
                    "@type": "/cosmos.auth.v1beta1.BaseAccount",
                    "address": addr(1),
                    "account_number": "0",
                },
                {
                    "@type": "/cosmos.auth.v1beta1.ModuleAccount",
                    "base_account": { "address": addr(2) },
                    "name": "gov",
                },
            ],
        },
        "genutil": {
            "gen_txs": [{
                "body": {
                    "messages": [{
                        "@type": "/cosmos.staking.v1beta1.MsgCreateValidator",
                        "delegator_address": addr(5),
                        "validator_address": valoper(5),
                    }],
                },
            }],
        },
        "wasm": {
            "codes": [{
                "code_id": "1",
                "code_info": {
                    "creator": addr(1),
                    "instantiate_config": { "permission": "Everybody" },
                },
            }],
        },
    })
}

#[test]
fn genesis_flush() {
    let chain = MockChain::new();
    chain.add_account(&addr(1), AuthAccount::Base);
    chain.add_account(&addr(2), AuthAccount::Module {
        name: "gov".to_string(),
    });
    chain.add_validator(5, "genesis-validator", false);

    let code_id = chain.store_code(CodeInfo {
        creator: addr(1),
        ..Default::default()
    });
    let contract = chain.instantiate(code_id, &addr(1), "registry", "{}");
    chain.set_cw2(&contract, "crates.io:registry", "0.1.0");

    let mut suite = TestSuite::new(chain);
    suite.init_chain(app_state()).unwrap();

    assert_that!(suite.published_keys()).is_equal_to(
        [
            "SET_ACCOUNT",
            "SET_ACCOUNT",
            "SET_VALIDATOR",
            "NEW_CODE",
            "UPDATE_CW2_INFO",
            "NEW_CONTRACT",
            "UPDATE_CODE",
            "NEW_CONTRACT_HISTORY",
            "COMMIT",
        ]
        .map(String::from)
        .to_vec(),
    );

    let published = suite.published();
    assert_that!(published.iter().all(|record| record.height == 0)).is_true();

    assert_json_eq!(published[0].value, json!({ "address": addr(1), "type": 0 }));
    assert_json_eq!(
        published[1].value,
        json!({ "address": addr(2), "type": 2, "name": "gov" })
    );
    assert_json_include!(
        actual: published[2].value.clone(),
        expected: json!({
            "operator_address": valoper(5),
            "delegator_address": addr(5),
            "moniker": "genesis-validator",
            "jailed": false,
        })
    );
    assert_json_eq!(
        published[3].value,
        json!({
            "id": 1,
            "uploader": addr(1),
            "contract_instantiated": 0,
            "access_config_permission": "Everybody",
            "access_config_addresses": [],
        })
    );
    assert_json_eq!(
        published[5].value,
        json!({
            "address": contract,
            "code_id": code_id,
            "init_msg": "{}",
            "init_by": addr(1),
            "contract_executed": 0,
            "label": "registry",
            "admin": "",
        })
    );
    assert_json_eq!(
        published[7].value["remark"],
        json!({
            "type": "genesis",
            "operation": "CONTRACT_CODE_HISTORY_OPERATION_TYPE_INIT",
        })
    );
    assert_json_eq!(published[8].value, json!({ "height": 0 }));
}

#[test]
fn empty_app_state_still_commits() {
    let mut suite = TestSuite::new(MockChain::new());
    suite.init_chain(json!({})).unwrap();

    assert_that!(suite.published_keys()).is_equal_to(vec!["COMMIT".to_string()]);
}

#[test]
fn non_account_entry_is_fatal() {
    let mut suite = TestSuite::new(MockChain::new());

    let err = suite
        .init_chain(json!({
            "auth": {
                "accounts": [{ "@type": "/cosmos.bank.v1beta1.Supply", "address": addr(1) }],
            },
        }))
        .unwrap_err();

    assert_that!(matches!(err, HookError::NotAnAccount(_))).is_true();
    assert_that!(suite.bus.batches().unwrap()).is_empty();
}
