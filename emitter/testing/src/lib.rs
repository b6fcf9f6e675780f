mod chain;
pub mod msgs;
mod suite;
mod tracing;

pub use {chain::*, suite::*, tracing::*};
