mod abci;
mod address;
mod coin;
mod error;
mod ev_map;
mod hash;
mod keeper;
mod msg;
mod record;

pub use {
    abci::*, address::*, coin::*, error::*, ev_map::*, hash::*, keeper::*, msg::*, record::*,
};

// -------------------------------- re-exports ---------------------------------

pub use serde_json::{json, Value as Json};
