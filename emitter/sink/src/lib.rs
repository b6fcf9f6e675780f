mod blob;
mod bus;
mod claim_check;
mod config;
mod error;
#[cfg(feature = "kafka")]
mod kafka;
mod memory;
mod runtime;
#[cfg(feature = "s3")]
mod s3;

#[cfg(feature = "kafka")]
pub use kafka::*;
#[cfg(feature = "s3")]
pub use s3::*;
pub use {
    blob::*, bus::*, claim_check::*, config::*, error::*, memory::*, runtime::*,
};
