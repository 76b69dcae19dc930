use crate::{Epoch, Hash256};
use serde::{Deserialize, Serialize};
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash;

/// The message that is actually signed: an object root bound to a signing domain.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, TreeHash)]
pub struct SigningData {
    pub object_root: Hash256,
    pub domain: Hash256,
}

pub trait SignedRoot: TreeHash {
    fn signing_root(&self, domain: Hash256) -> Hash256 {
        SigningData {
            object_root: self.tree_hash_root(),
            domain,
        }
        .tree_hash_root()
    }
}

// Sync committee messages sign a block root directly.
impl SignedRoot for Hash256 {}

// RANDAO reveals sign the epoch.
impl SignedRoot for Epoch {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signing_root_is_two_leaf_root() {
        let object_root = Hash256::repeat_byte(1);
        let domain = Hash256::repeat_byte(2);

        let expected = Hash256::from(ethereum_hashing::hash32_concat(
            object_root.as_bytes(),
            domain.as_bytes(),
        ));
        assert_eq!(object_root.signing_root(domain), expected);
    }

    #[test]
    fn epoch_signing_root_uses_uint64_leaf() {
        let domain = Hash256::repeat_byte(3);

        let mut leaf = [0; 32];
        leaf[..8].copy_from_slice(&42u64.to_le_bytes());
        let expected = Hash256::from(ethereum_hashing::hash32_concat(&leaf, domain.as_bytes()));

        assert_eq!(Epoch::new(42).signing_root(domain), expected);
    }

    #[test]
    fn domain_changes_signing_root() {
        let object_root = Hash256::repeat_byte(1);
        assert_ne!(
            object_root.signing_root(Hash256::repeat_byte(2)),
            object_root.signing_root(Hash256::repeat_byte(3))
        );
    }
}
