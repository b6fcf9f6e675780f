use {
    emitter_types::{Bech32Codec, Json},
    std::collections::BTreeSet,
};

/// Collect every string leaf of `value` that is a valid account address.
/// Object keys are not considered.
pub fn collect_accounts(codec: &Bech32Codec, value: &Json, accounts: &mut BTreeSet<String>) {
    match value {
        Json::Object(map) => {
            for value in map.values() {
                collect_accounts(codec, value, accounts);
            }
        },
        Json::Array(values) => {
            for value in values {
                collect_accounts(codec, value, accounts);
            }
        },
        Json::String(s) => {
            if codec.is_account(s) {
                accounts.insert(s.clone());
            }
        },
        Json::Null | Json::Bool(_) | Json::Number(_) => {},
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, assertor::*, emitter_types::json, proptest::prelude::*};

    const ALICE: &str = "wasm1qyqszqgpqyqszqgpqyqszqgpqyqszqgpc0styh";
    const VALOPER: &str = "wasmvaloper1qyqszqgpqyqszqgpqyqszqgpqyqszqgpdn9h2d";

    fn codec() -> Bech32Codec {
        Bech32Codec::new("wasm")
    }

    #[test]
    fn finds_nested_addresses() {
        let msg = json!({
            "@type": "/cosmos.bank.v1beta1.MsgMultiSend",
            "inputs": [{ "address": ALICE, "coins": [{ "denom": "uatom", "amount": "5" }] }],
            "outputs": [{ "address": VALOPER }],
            "wasm1qyqszqgpqyqszqgpqyqszqgpqyqszqgpc0styh": 1,
        });

        let mut accounts = BTreeSet::new();
        collect_accounts(&codec(), &msg, &mut accounts);

        assert_that!(accounts).is_equal_to(BTreeSet::from([ALICE.to_string()]));
    }

    fn address() -> impl Strategy<Value = String> {
        prop::array::uniform20(any::<u8>())
            .prop_map(|bytes| codec().encode_account(&bytes).unwrap())
    }

    fn leaf() -> impl Strategy<Value = Json> {
        prop_oneof![
            address().prop_map(Json::String),
            "[a-z0-9]{0,12}".prop_map(Json::String),
            any::<i64>().prop_map(|n| json!(n)),
            any::<bool>().prop_map(Json::Bool),
            Just(Json::Null),
        ]
    }

    fn tree() -> impl Strategy<Value = Json> {
        leaf().prop_recursive(4, 64, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Json::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                    .prop_map(|map| Json::Object(map.into_iter().collect())),
            ]
        })
    }

    fn string_leaves(value: &Json, leaves: &mut Vec<String>) {
        match value {
            Json::Object(map) => map.values().for_each(|v| string_leaves(v, leaves)),
            Json::Array(values) => values.iter().for_each(|v| string_leaves(v, leaves)),
            Json::String(s) => leaves.push(s.clone()),
            _ => {},
        }
    }

    proptest! {
        #[test]
        fn collects_exactly_the_valid_leaves(value in tree()) {
            let codec = codec();

            let mut leaves = Vec::new();
            string_leaves(&value, &mut leaves);
            let expected = leaves
                .into_iter()
                .filter(|s| codec.decode_account(s).is_ok())
                .collect::<BTreeSet<_>>();

            let mut accounts = BTreeSet::new();
            collect_accounts(&codec, &value, &mut accounts);

            prop_assert_eq!(accounts, expected);
        }
    }
}
