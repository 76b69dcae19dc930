use crate::{ForkVersion, Hash256};
use serde::{Deserialize, Serialize};
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash;

/// The first four bytes of a fork data root.
pub type ForkDigest = [u8; 4];

/// Specifies a fork of the `BeaconChain`, to prevent replay attacks.
///
/// Field order is part of the `hash_tree_root` and must not change.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TreeHash)]
pub struct ForkData {
    #[serde(with = "ethereum_serde_utils::bytes_4_hex")]
    pub current_version: ForkVersion,
    pub genesis_validators_root: Hash256,
}

impl ForkData {
    pub fn new(current_version: ForkVersion, genesis_validators_root: Hash256) -> Self {
        Self {
            current_version,
            genesis_validators_root,
        }
    }

    pub fn fork_digest(&self) -> ForkDigest {
        let mut digest = ForkDigest::default();
        digest.copy_from_slice(&self.tree_hash_root().as_bytes()[..4]);
        digest
    }
}

/// Return the 32-byte fork data root for the `current_version` and `genesis_validators_root`.
///
/// This is used primarily in signature domains to avoid collisions across forks/chains.
pub fn compute_fork_data_root(
    current_version: ForkVersion,
    genesis_validators_root: Hash256,
) -> Hash256 {
    ForkData::new(current_version, genesis_validators_root).tree_hash_root()
}
