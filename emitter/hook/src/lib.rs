mod accounts;
mod adapter;
pub mod adapters;
mod error;
mod genesis;
mod hook;
mod tx;
mod verifier;

pub use {accounts::*, adapter::*, error::*, genesis::*, hook::*, tx::*, verifier::*};
