mod bank;
mod gov;
mod ibc;
mod validator;
mod wasm;

pub use {bank::*, gov::*, ibc::*, validator::*, wasm::*};
