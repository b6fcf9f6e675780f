use {emitter_sink::SinkError, emitter_types::TypesError, thiserror::Error};

/// Conditions the emitter can't recover from. The host is expected to halt and
/// replay the block after a restart.
#[derive(Debug, Error)]
pub enum HookError {
    #[error(transparent)]
    Types(#[from] TypesError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error("malformed genesis: {0}")]
    Genesis(String),

    #[error("genesis entry of type `{0}` is not an account")]
    NotAnAccount(String),

    #[error("transaction {hash} has no {facet}")]
    MissingFacet { hash: String, facet: &'static str },

    #[error("transaction {0} has no messages")]
    EmptyTx(String),

    #[error("no log for message {index} of transaction {hash}")]
    MissingMessageLog { hash: String, index: usize },

    #[error("malformed vote option `{0}`")]
    VoteOption(String),

    #[error("block buffer does not start with NEW_BLOCK")]
    MissingNewBlock,

    #[error("{0}")]
    Fatal(String),
}

pub type Result<T> = core::result::Result<T, HookError>;

/// Return early with a [`HookError::Fatal`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::HookError::Fatal(format!($($arg)*)))
    };
}
