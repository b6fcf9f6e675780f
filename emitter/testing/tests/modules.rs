use {
    assert_json_diff::{assert_json_eq, assert_json_include},
    assertor::*,
    emitter_testing::{addr, msgs, valcons, valoper, MockChain, TestSuite, TestTx},
    emitter_types::{json, CodeInfo, ContentKind, Event, Proposal},
    std::collections::BTreeSet,
};

#[test]
fn staking_messages_refresh_validators() {
    let chain = MockChain::new();
    chain.add_validator(3, "alpha", false);
    chain.add_validator(4, "beta", false);

    let mut suite = TestSuite::new(chain);
    let tx = TestTx::new(vec![
        msgs::delegate(&addr(1), &valoper(3), "100ustake"),
        msgs::begin_redelegate(&addr(1), &valoper(3), &valoper(4)),
    ]);
    suite.make_block(20, vec![tx]).unwrap();

    // Only the delegation re-reads a validator.
    let validators = suite.published_values("SET_VALIDATOR");
    assert_that!(validators).has_length(1);
    assert_json_include!(
        actual: validators[0].clone(),
        expected: json!({
            "operator_address": valoper(3),
            "delegator_address": addr(3),
            "consensus_address": valcons(3),
            "moniker": "alpha",
            "identity": "alpha-identity",
            "jailed": false,
        })
    );

    let new_tx = &suite.published_values("NEW_TRANSACTION")[0];
    assert_json_include!(
        actual: new_tx["messages"][0]["detail"].clone(),
        expected: json!({ "moniker": "alpha", "identity": "alpha-identity" })
    );
    assert_json_include!(
        actual: new_tx["messages"][1]["detail"].clone(),
        expected: json!({
            "src_moniker": "alpha",
            "src_identity": "alpha-identity",
            "dst_moniker": "beta",
            "dst_identity": "beta-identity",
        })
    );
}

#[test]
fn create_validator_emits_the_new_validator() {
    let chain = MockChain::new();
    chain.add_validator(6, "gamma", false);

    let mut suite = TestSuite::new(chain);
    let tx = TestTx::new(vec![msgs::create_validator(&addr(6), &valoper(6))]);
    suite.make_block(21, vec![tx]).unwrap();

    let keys = suite.published_keys();
    let position = |key: &str| keys.iter().position(|k| k == key).unwrap();
    assert_that!(position("INSERT_LCD_TX_RESULTS")).is_less_than(position("SET_VALIDATOR"));
    assert_that!(position("SET_VALIDATOR")).is_less_than(position("SET_RELATED_TRANSACTION"));

    let validator = &suite.published_values("SET_VALIDATOR")[0];
    assert_that!(validator["moniker"].as_str()).is_equal_to(Some("gamma"));
}

#[test]
fn packet_received_by_a_contract() {
    let chain = MockChain::new();
    let code_id = chain.store_code(CodeInfo::default());
    let contract = chain.instantiate(code_id, &addr(1), "ibc-app", "{}");

    let mut suite = TestSuite::new(chain);
    let tx = TestTx::new(vec![msgs::recv_packet(&addr(1), &format!("wasm.{contract}"))]);
    let hashes = suite.make_block(22, vec![tx]).unwrap();

    let new_tx = &suite.published_values("NEW_TRANSACTION")[0];
    assert_that!(new_tx["is_ibc"].as_bool()).is_equal_to(Some(true));
    assert_that!(new_tx["is_send"].as_bool()).is_equal_to(Some(false));

    let contract_txs = suite.published_values("NEW_CONTRACT_TRANSACTION");
    assert_that!(contract_txs).has_length(1);
    assert_json_eq!(
        contract_txs[0],
        json!({
            "contract_address": contract,
            "tx_hash": hashes[0],
            "is_instantiate": false,
        })
    );
}

#[test]
fn packet_on_a_module_port_touches_no_contract() {
    let mut suite = TestSuite::new(MockChain::new());
    let tx = TestTx::new(vec![msgs::recv_packet(&addr(1), "transfer")]);
    suite.make_block(23, vec![tx]).unwrap();

    let new_tx = &suite.published_values("NEW_TRANSACTION")[0];
    assert_that!(new_tx["is_ibc"].as_bool()).is_equal_to(Some(true));
    assert_that!(suite.published_values("NEW_CONTRACT_TRANSACTION")).is_empty();
}

#[test]
fn admin_update() {
    let chain = MockChain::new();
    let code_id = chain.store_code(CodeInfo::default());
    let contract = chain.instantiate(code_id, &addr(1), "owned", "{}");

    let mut suite = TestSuite::new(chain);
    let tx = TestTx::new(vec![msgs::update_admin(&addr(1), &contract, &addr(2))])
        .with_memo("hand over");
    suite.make_block(24, vec![tx]).unwrap();

    assert_json_eq!(
        suite.published_values("UPDATE_CONTRACT_ADMIN"),
        json!([{ "contract": contract, "admin": addr(2) }])
    );

    let new_tx = &suite.published_values("NEW_TRANSACTION")[0];
    assert_json_include!(
        actual: new_tx.clone(),
        expected: json!({
            "memo": "hand over",
            "is_update_admin": true,
            "is_clear_admin": false,
        })
    );

    let contract_txs = suite.published_values("NEW_CONTRACT_TRANSACTION");
    assert_that!(contract_txs[0]["contract_address"].as_str()).is_equal_to(Some(contract.as_str()));
}

#[test]
fn legacy_text_proposal() {
    let chain = MockChain::new();
    let content = msgs::legacy_content(&addr(9), "signal", ContentKind::Text);
    chain.add_proposal(Proposal {
        id: 3,
        messages: vec![content.clone()],
        ..Default::default()
    });

    let mut suite = TestSuite::new(chain);
    let tx = TestTx::new(vec![msgs::submit_proposal(&addr(1), &[content])]).with_events(0, vec![
        Event::new("submit_proposal").add_attribute("proposal_id", "3"),
    ]);
    suite.make_block(25, vec![tx]).unwrap();

    let proposals = suite.published_values("NEW_PROPOSAL");
    assert_that!(proposals).has_length(1);
    assert_json_include!(
        actual: proposals[0].clone(),
        expected: json!({
            "id": 3,
            "proposer": addr(1),
            "type": "Text",
            "title": "signal",
            "description": "signal description",
            "proposal_route": "gov",
            "version": "v1beta1",
            "resolved_height": null,
            "content": { "title": "signal", "description": "signal description" },
        })
    );

    let new_tx = &suite.published_values("NEW_TRANSACTION")[0];
    assert_that!(new_tx["messages"][0]["detail"]["proposal_id"].as_u64()).is_equal_to(Some(3));
}

#[test]
fn contract_migration() {
    let chain = MockChain::new();
    let old_code = chain.store_code(CodeInfo::default());
    let contract = chain.instantiate(old_code, &addr(1), "counter", "{}");
    let new_code = chain.store_code(CodeInfo::default());

    let mut suite = TestSuite::new(chain);
    let tx = TestTx::new(vec![msgs::migrate(&addr(1), &contract, new_code)]).with_events(0, vec![
        Event::new("migrate")
            .add_attribute("_contract_address", contract.clone())
            .add_attribute("code_id", new_code.to_string()),
    ]);
    let hashes = suite.make_block(26, vec![tx]).unwrap();

    let published = suite.published();
    let start = published
        .iter()
        .position(|record| record.key == "INSERT_LCD_TX_RESULTS")
        .unwrap();
    let keys = published[start + 1..]
        .iter()
        .map(|record| record.key.as_str())
        .collect::<Vec<_>>();
    assert_that!(keys).is_equal_to(vec![
        "UPDATE_CONTRACT_CODE_ID",
        "NEW_CONTRACT_HISTORY",
        "SET_RELATED_TRANSACTION",
        "NEW_CONTRACT_TRANSACTION",
        "COMMIT",
    ]);

    assert_json_eq!(
        published[start + 1].value,
        json!({ "contract": contract, "code_id": new_code })
    );
    // The remark carries the transaction hash in upper-case hex.
    assert_json_eq!(
        published[start + 2].value,
        json!({
            "contract_address": contract,
            "sender": addr(1),
            "code_id": new_code,
            "block_height": 26,
            "remark": {
                "type": "transaction",
                "operation": "CONTRACT_CODE_HISTORY_OPERATION_TYPE_MIGRATE",
                "value": hashes[0].to_string().to_uppercase(),
            },
        })
    );
    assert_json_eq!(
        published[start + 4].value,
        json!({
            "contract_address": contract,
            "tx_hash": hashes[0],
            "is_instantiate": false,
        })
    );

    let new_tx = &suite.published_values("NEW_TRANSACTION")[0];
    assert_that!(new_tx["is_migrate"].as_bool()).is_equal_to(Some(true));
}

#[test]
fn contracts_touched_by_execution() {
    let chain = MockChain::new();
    let code_id = chain.store_code(CodeInfo::default());
    let router = chain.instantiate(code_id, &addr(1), "router", "{}");
    let hook = chain.instantiate(code_id, &addr(1), "hook", "{}");

    let mut suite = TestSuite::new(chain);
    let execute_msg = json!({ "ping": {} });
    let tx = TestTx::new(vec![msgs::execute(&addr(1), &router, execute_msg.clone())]).with_events(
        0,
        vec![
            Event::new("execute").add_attribute("_contract_address", router.clone()),
            Event::new("sudo").add_attribute("_contract_address", hook.clone()),
        ],
    );
    suite.make_block(27, vec![tx]).unwrap();

    let touched = suite
        .published_values("NEW_CONTRACT_TRANSACTION")
        .iter()
        .map(|value| value["contract_address"].as_str().unwrap().to_string())
        .collect::<BTreeSet<_>>();
    assert_that!(touched).is_equal_to(BTreeSet::from([router, hook]));

    let new_tx = &suite.published_values("NEW_TRANSACTION")[0];
    assert_that!(new_tx["is_execute"].as_bool()).is_equal_to(Some(true));
    assert_that!(new_tx["messages"][0]["detail"]["msg_json"].as_str())
        .is_equal_to(Some(execute_msg.to_string().as_str()));
}
