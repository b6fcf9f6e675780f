use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid bech32 string `{input}`: {reason}")]
    Bech32 { input: String, reason: String },

    #[error("expected bech32 prefix `{expected}`, found `{found}`")]
    Bech32Prefix { expected: String, found: String },

    #[error("port `{0}` is not bound to a contract")]
    NotContractPort(String),

    #[error("invalid coin expression `{0}`")]
    InvalidCoin(String),

    #[error("attribute `{key}` has a non-integer value `{value}`")]
    NotAnInteger { key: String, value: String },

    #[error("attribute `{0}` is missing")]
    MissingAttribute(String),

    /// Two positionally paired attributes carry a different number of values.
    #[error("attribute count mismatch: `{left}` has {left_len} values but `{right}` has {right_len}")]
    AttributeMismatch {
        left: String,
        left_len: usize,
        right: String,
        right_len: usize,
    },

    #[error("codec error: {0}")]
    Codec(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, TypesError>;
