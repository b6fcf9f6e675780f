use {
    crate::{HookError, Result},
    emitter_types::{AccessConfig, DecodedTx, Json, TxCodec},
    serde::{de::DeserializeOwned, Deserialize},
    serde_with::{serde_as, DisplayFromStr, PickFirst},
    std::collections::BTreeMap,
};

/// The parts of the genesis app state the emitter reports on.
#[derive(Debug, Clone, Default)]
pub struct Genesis {
    pub accounts: Vec<GenesisAccount>,
    pub gen_txs: Vec<DecodedTx>,
    pub codes: Vec<GenesisCode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisAccount {
    pub type_url: String,
    pub address: String,
}

#[serde_as]
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GenesisCode {
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub code_id: u64,
    pub code_info: GenesisCodeInfo,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct GenesisCodeInfo {
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub instantiate_config: AccessConfig,
}

#[derive(Deserialize, Default)]
struct AuthGenesis {
    #[serde(default)]
    accounts: Vec<Json>,
}

#[derive(Deserialize, Default)]
struct GenutilGenesis {
    #[serde(default)]
    gen_txs: Vec<Json>,
}

#[derive(Deserialize, Default)]
struct WasmGenesis {
    #[serde(default)]
    codes: Vec<GenesisCode>,
}

impl Genesis {
    /// Parse the app state: a JSON object keyed by module name. Missing
    /// module sections are treated as empty.
    pub fn parse(app_state: &[u8], codec: &dyn TxCodec) -> Result<Self> {
        let state: BTreeMap<String, Json> = serde_json::from_slice(app_state)
            .map_err(|err| HookError::Genesis(err.to_string()))?;

        let auth: AuthGenesis = section(&state, "auth")?;
        let accounts = auth
            .accounts
            .iter()
            .map(parse_account)
            .collect::<Result<Vec<_>>>()?;

        let genutil: GenutilGenesis = section(&state, "genutil")?;
        let gen_txs = genutil
            .gen_txs
            .iter()
            .map(|tx| codec.decode_json_tx(tx))
            .collect::<emitter_types::Result<Vec<_>>>()?;

        let wasm: WasmGenesis = section(&state, "wasm")?;

        Ok(Self {
            accounts,
            gen_txs,
            codes: wasm.codes,
        })
    }
}

fn section<T>(state: &BTreeMap<String, Json>, module: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match state.get(module) {
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|err| HookError::Genesis(format!("{module}: {err}"))),
        None => Ok(T::default()),
    }
}

fn parse_account(entry: &Json) -> Result<GenesisAccount> {
    let type_url = entry
        .get("@type")
        .and_then(Json::as_str)
        .unwrap_or_default()
        .to_string();

    match find_address(entry) {
        Some(address) if type_url.ends_with("Account") => Ok(GenesisAccount {
            type_url,
            address: address.to_string(),
        }),
        _ => Err(HookError::NotAnAccount(type_url)),
    }
}

/// The address of an account entry, either at the top level or inside the
/// embedded base account of module, vesting and interchain accounts.
fn find_address(entry: &Json) -> Option<&str> {
    let object = entry.as_object()?;

    if let Some(address) = object.get("address").and_then(Json::as_str) {
        if !address.is_empty() {
            return Some(address);
        }
    }

    object
        .values()
        .filter(|value| value.is_object())
        .find_map(find_address)
}

// ----------------------------------- tests -----------------------------------
