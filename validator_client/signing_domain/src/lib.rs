//! Resolves the 32-byte signing domain a validator signs every consensus message under.
//!
//! A domain binds a signature to a message type, a fork and a network:
//!
//! ```text
//! domain = domain_type ++ hash_tree_root(ForkData { fork_version, genesis_validators_root })[..28]
//! ```
//!
//! The fork version comes from the immutable fork schedule in the `ChainSpec`. The genesis
//! validators root is fetched once from a `GenesisProvider` (usually the beacon node) and cached
//! by the `SigningDomainService` for the rest of its life.

pub mod chain_spec;
pub mod domain;
mod epoch;
pub mod fork_data;
mod fork_name;
pub mod fork_schedule;
pub mod genesis;
pub mod signing_data;
mod signing_domain_service;

pub use chain_spec::{ChainSpec, Config, FAR_FUTURE_EPOCH};
pub use domain::{compute_domain, ApplicationDomain, Domain, DomainType};
pub use epoch::Epoch;
pub use fork_data::{compute_fork_data_root, ForkData, ForkDigest};
pub use fork_name::ForkName;
pub use fork_schedule::{ForkSchedule, ForkScheduleEntry};
pub use genesis::{GenesisData, GenesisInfoCache, GenesisProvider};
pub use signing_data::{SignedRoot, SigningData};
pub use signing_domain_service::{Error, SigningDomainService};

pub type Hash256 = ethereum_types::H256;
pub type ForkVersion = [u8; 4];
