use {
    crate::{Result, TypesError},
    bech32::{Bech32, Hrp},
    sha2::{Digest, Sha256},
};

/// Port IDs of contract-bound IBC ports start with this prefix, followed by
/// the contract's bech32 address.
pub const CONTRACT_PORT_PREFIX: &str = "wasm.";

/// Length of a contract address derived by [`build_contract_address_classic`].
pub const CONTRACT_ADDRESS_LENGTH: usize = 32;

const CONTRACT_MODULE_NAME: &[u8] = b"wasm";

/// Bech32 codec for the three address flavors of a chain: accounts, validator
/// operators, and consensus nodes.
///
/// The validator and consensus prefixes are derived from the account prefix,
/// e.g. `wasm`, `wasmvaloper`, and `wasmvalcons`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bech32Codec {
    account_prefix: String,
    validator_prefix: String,
    consensus_prefix: String,
}

impl Bech32Codec {
    pub fn new<T>(account_prefix: T) -> Self
    where
        T: Into<String>,
    {
        let account_prefix = account_prefix.into();

        Self {
            validator_prefix: format!("{account_prefix}valoper"),
            consensus_prefix: format!("{account_prefix}valcons"),
            account_prefix,
        }
    }

    pub fn account_prefix(&self) -> &str {
        &self.account_prefix
    }

    pub fn decode_account(&self, input: &str) -> Result<Vec<u8>> {
        decode(&self.account_prefix, input)
    }

    pub fn encode_account(&self, bytes: &[u8]) -> Result<String> {
        encode(&self.account_prefix, bytes)
    }

    /// Whether the string is a well-formed account address of this chain.
    pub fn is_account(&self, input: &str) -> bool {
        self.decode_account(input).is_ok()
    }

    pub fn decode_validator(&self, input: &str) -> Result<Vec<u8>> {
        decode(&self.validator_prefix, input)
    }

    pub fn encode_validator(&self, bytes: &[u8]) -> Result<String> {
        encode(&self.validator_prefix, bytes)
    }

    pub fn decode_consensus(&self, input: &str) -> Result<Vec<u8>> {
        decode(&self.consensus_prefix, input)
    }

    pub fn encode_consensus(&self, bytes: &[u8]) -> Result<String> {
        encode(&self.consensus_prefix, bytes)
    }

    /// Reinterpret an account address as the operator address with the same bytes.
    pub fn account_to_validator(&self, account: &str) -> Result<String> {
        self.encode_validator(&self.decode_account(account)?)
    }

    /// Reinterpret an operator address as the account address with the same bytes.
    pub fn validator_to_account(&self, validator: &str) -> Result<String> {
        self.encode_account(&self.decode_validator(validator)?)
    }

    /// Bech32 form of [`build_contract_address_classic`].
    pub fn contract_address(&self, code_id: u64, instance_id: u64) -> Result<String> {
        self.encode_account(&build_contract_address_classic(code_id, instance_id))
    }

    /// Find the contract bound to an IBC port, if the port is a contract port.
    pub fn contract_from_port_id(&self, port_id: &str) -> Result<String> {
        let Some(contract) = port_id.strip_prefix(CONTRACT_PORT_PREFIX) else {
            return Err(TypesError::NotContractPort(port_id.to_string()));
        };

        self.encode_account(&self.decode_account(contract)?)
    }
}

/// Derive the address of a contract from its code ID and instance ID:
///
/// ```plain
/// address := sha256(sha256("module") | "wasm" | 0x00 | code_id | instance_id)
/// ```
///
/// where `|` means byte concatenation and both IDs are big-endian `u64`s.
pub fn build_contract_address_classic(
    code_id: u64,
    instance_id: u64,
) -> [u8; CONTRACT_ADDRESS_LENGTH] {
    let mut key = Vec::with_capacity(CONTRACT_MODULE_NAME.len() + 1 + 16);
    key.extend_from_slice(CONTRACT_MODULE_NAME);
    key.push(0);
    key.extend_from_slice(&code_id.to_be_bytes());
    key.extend_from_slice(&instance_id.to_be_bytes());

    let mut hasher = Sha256::new();
    hasher.update(Sha256::digest(b"module"));
    hasher.update(&key);
    hasher.finalize().into()
}

fn decode(prefix: &str, input: &str) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Err(TypesError::Bech32 {
            input: input.to_string(),
            reason: "empty address string is not allowed".to_string(),
        });
    }

    let (hrp, bytes) = bech32::decode(input).map_err(|err| TypesError::Bech32 {
        input: input.to_string(),
        reason: err.to_string(),
    })?;

    if !hrp.as_str().eq_ignore_ascii_case(prefix) {
        return Err(TypesError::Bech32Prefix {
            expected: prefix.to_string(),
            found: hrp.as_str().to_string(),
        });
    }

    if bytes.is_empty() || bytes.len() > 255 {
        return Err(TypesError::Bech32 {
            input: input.to_string(),
            reason: format!("invalid address length {}", bytes.len()),
        });
    }

    Ok(bytes)
}

fn encode(prefix: &str, bytes: &[u8]) -> Result<String> {
    let hrp = Hrp::parse(prefix).map_err(|err| TypesError::Bech32 {
        input: prefix.to_string(),
        reason: err.to_string(),
    })?;

    bech32::encode::<Bech32>(hrp, bytes).map_err(|err| TypesError::Bech32 {
        input: hex::encode(bytes),
        reason: err.to_string(),
    })
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, assertor::*, test_case::test_case};

    const ACCOUNT: &str = "wasm1qyqszqgpqyqszqgpqyqszqgpqyqszqgpc0styh";
    const VALIDATOR: &str = "wasmvaloper1qyqszqgpqyqszqgpqyqszqgpqyqszqgpdn9h2d";
    const CONSENSUS: &str = "wasmvalcons1qyqszqgpqyqszqgpqyqszqgpqyqszqgpeqktxv";

    fn codec() -> Bech32Codec {
        Bech32Codec::new("wasm")
    }

    #[test]
    fn encoding_each_flavor() {
        let codec = codec();

        assert_that!(codec.encode_account(&[1; 20]).unwrap()).is_equal_to(ACCOUNT.to_string());
        assert_that!(codec.encode_validator(&[1; 20]).unwrap())
            .is_equal_to(VALIDATOR.to_string());
        assert_that!(codec.encode_consensus(&[1; 20]).unwrap())
            .is_equal_to(CONSENSUS.to_string());
        assert_that!(codec.decode_consensus(CONSENSUS).unwrap()).is_equal_to(vec![1; 20]);
    }

    #[test]
    fn converting_between_account_and_validator() {
        let codec = codec();

        assert_that!(codec.account_to_validator(ACCOUNT).unwrap())
            .is_equal_to(VALIDATOR.to_string());
        assert_that!(codec.validator_to_account(VALIDATOR).unwrap())
            .is_equal_to(ACCOUNT.to_string());
    }

    #[test_case(ACCOUNT, true ; "account")]
    #[test_case(VALIDATOR, false ; "validator prefix")]
    #[test_case(CONSENSUS, false ; "consensus prefix")]
    #[test_case("cosmos1qyqszqgpqyqszqgpqyqszqgpqyqszqgpjnp7du", false ; "foreign chain")]
    #[test_case("wasm1qyqszqgpqyqszqgpqyqszqgpqyqszqgpc0styx", false ; "bad checksum")]
    #[test_case("", false ; "empty")]
    #[test_case("uwasm", false ; "denom")]
    fn recognizing_accounts(input: &str, expected: bool) {
        assert_that!(codec().is_account(input)).is_equal_to(expected);
    }

    #[test]
    fn classic_contract_address() {
        assert_that!(codec().contract_address(1, 1).unwrap()).is_equal_to(
            "wasm14hj2tavq8fpesdwxxcu44rty3hh90vhujrvcmstl4zr3txmfvw9s0phg4d".to_string(),
        );
        assert_that!(codec().contract_address(7, 3).unwrap()).is_equal_to(
            "wasm1f6jlx7d9y408tlzue7r2qcf79plp549n30yzqjajjud8vm7m4vds63cq9a".to_string(),
        );
    }

    #[test]
    fn contract_ports() {
        let codec = codec();
        let contract = codec.contract_address(1, 1).unwrap();

        assert_that!(codec.contract_from_port_id(&format!("wasm.{contract}")).unwrap())
            .is_equal_to(contract);
        assert!(codec.contract_from_port_id("transfer").is_err());
        assert!(codec.contract_from_port_id("wasm.notanaddress").is_err());
    }
}
