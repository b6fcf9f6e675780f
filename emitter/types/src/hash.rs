use {
    base64::{engine::general_purpose::STANDARD, Engine},
    serde::{Serialize, Serializer},
    sha2::{Digest, Sha256},
    std::fmt,
};

/// Hash of a transaction: the SHA-256 digest of its raw bytes.
///
/// Downstream consumers expect byte arrays in standard base64 inside JSON
/// values, so that is how the hash serializes. Its `Display` form is upper-case
/// hex, the form used by block explorers and in contract history remarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub const LENGTH: usize = 32;

    pub const fn from_array(array: [u8; Self::LENGTH]) -> Self {
        Self(array)
    }

    pub fn from_tx_bytes(tx: &[u8]) -> Self {
        Self(Sha256::digest(tx).into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

impl Serialize for TxHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_base64())
    }
}

/// Encode arbitrary bytes the way byte arrays appear in record values.
pub fn base64_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

// ----------------------------------- tests -----------------------------------
