use crate::Hash256;
use serde::{Deserialize, Serialize};
use std::fmt;
use tree_hash::{PackedEncoding, TreeHash, TreeHashType};

/// An epoch number, as used throughout the consensus protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Epoch(u64);

impl Epoch {
    pub const fn new(epoch: u64) -> Epoch {
        Epoch(epoch)
    }

    pub const fn max_value() -> Epoch {
        Epoch(u64::MAX)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn saturating_sub(self, other: u64) -> Epoch {
        Epoch(self.0.saturating_sub(other))
    }

    pub fn saturating_add(self, other: u64) -> Epoch {
        Epoch(self.0.saturating_add(other))
    }
}

impl From<u64> for Epoch {
    fn from(epoch: u64) -> Epoch {
        Epoch(epoch)
    }
}

impl From<Epoch> for u64 {
    fn from(epoch: Epoch) -> u64 {
        epoch.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl slog::Value for Epoch {
    fn serialize(
        &self,
        record: &slog::Record,
        key: slog::Key,
        serializer: &mut dyn slog::Serializer,
    ) -> slog::Result {
        slog::Value::serialize(&self.0, record, key, serializer)
    }
}

/// Hashed as a `uint64`.
impl TreeHash for Epoch {
    fn tree_hash_type() -> TreeHashType {
        TreeHashType::Basic
    }

    fn tree_hash_packed_encoding(&self) -> PackedEncoding {
        self.0.tree_hash_packed_encoding()
    }

    fn tree_hash_packing_factor() -> usize {
        u64::tree_hash_packing_factor()
    }

    fn tree_hash_root(&self) -> Hash256 {
        self.0.tree_hash_root()
    }
}
