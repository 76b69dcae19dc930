use crate::fork_data::compute_fork_data_root;
use crate::{ForkVersion, Hash256};

/// The 4-byte prefix of a signing domain, identifying the kind of message being signed.
pub type DomainType = [u8; 4];

/// Each of the BLS signature domains.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Domain {
    BeaconProposer,
    BeaconAttester,
    Randao,
    Deposit,
    VoluntaryExit,
    SelectionProof,
    AggregateAndProof,
    SyncCommittee,
    ContributionAndProof,
    SyncCommitteeSelectionProof,
    BlsToExecutionChange,
    ApplicationMask(ApplicationDomain),
}

/// This value is an application index of 0 with the bitmask applied (so it's equivalent to the bit mask).
/// Little endian hex: 0x00000001, Binary: 1000000000000000000000000
pub const APPLICATION_DOMAIN_BUILDER: u32 = 16777216;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ApplicationDomain {
    Builder,
}

impl ApplicationDomain {
    pub fn get_domain_constant(&self) -> u32 {
        match self {
            ApplicationDomain::Builder => APPLICATION_DOMAIN_BUILDER,
        }
    }
}

/// Converts a domain constant into its on-the-wire bytes.
pub fn int_to_bytes4(int: u32) -> DomainType {
    int.to_le_bytes()
}

/// Compute a domain by applying the given `fork_version`.
///
/// The result is `domain_type` followed by the first 28 bytes of the fork data root.
pub fn compute_domain(
    domain_type: DomainType,
    fork_version: ForkVersion,
    genesis_validators_root: Hash256,
) -> Hash256 {
    let fork_data_root = compute_fork_data_root(fork_version, genesis_validators_root);

    let mut domain = [0; 32];
    domain[0..4].copy_from_slice(&domain_type);
    domain[4..].copy_from_slice(&fork_data_root.as_bytes()[..28]);

    Hash256::from(domain)
}
