use crate::domain::{int_to_bytes4, ApplicationDomain, Domain, DomainType};
use crate::fork_schedule::{self, ForkSchedule, ForkScheduleEntry};
use crate::{Epoch, ForkName, ForkVersion};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Epoch used in `config.yaml` files to signal that a fork is not scheduled.
pub const FAR_FUTURE_EPOCH: Epoch = Epoch::max_value();

/// Holds the network parameters needed to compute signing domains.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSpec {
    pub config_name: Option<String>,
    pub fork_schedule: ForkSchedule,

    /*
     * Signature domains
     */
    pub domain_beacon_proposer: u32,
    pub domain_beacon_attester: u32,
    pub domain_randao: u32,
    pub domain_deposit: u32,
    pub domain_voluntary_exit: u32,
    pub domain_selection_proof: u32,
    pub domain_aggregate_and_proof: u32,
    pub domain_sync_committee: u32,
    pub domain_sync_committee_selection_proof: u32,
    pub domain_contribution_and_proof: u32,
    pub domain_bls_to_execution_change: u32,
    pub domain_application_mask: u32,
}

impl ChainSpec {
    /// Returns a `ChainSpec` compatible with the Ethereum Foundation mainnet.
    pub fn mainnet() -> Self {
        Self {
            config_name: Some("mainnet".to_string()),
            fork_schedule: ForkSchedule::mainnet(),
            domain_beacon_proposer: 0,
            domain_beacon_attester: 1,
            domain_randao: 2,
            domain_deposit: 3,
            domain_voluntary_exit: 4,
            domain_selection_proof: 5,
            domain_aggregate_and_proof: 6,
            domain_sync_committee: 7,
            domain_sync_committee_selection_proof: 8,
            domain_contribution_and_proof: 9,
            domain_bls_to_execution_change: 10,
            domain_application_mask: ApplicationDomain::Builder.get_domain_constant(),
        }
    }

    /// Build a spec from a `config.yaml`, falling back to mainnet domain constants where the
    /// config is silent.
    pub fn from_config(config: &Config) -> Result<Self, fork_schedule::Error> {
        let mainnet = Self::mainnet();
        let domain = |value: Option<DomainType>, default: u32| {
            value.map(u32::from_le_bytes).unwrap_or(default)
        };

        Ok(Self {
            config_name: config.config_name.clone(),
            fork_schedule: config.fork_schedule()?,
            domain_beacon_proposer: domain(
                config.domain_beacon_proposer,
                mainnet.domain_beacon_proposer,
            ),
            domain_beacon_attester: domain(
                config.domain_beacon_attester,
                mainnet.domain_beacon_attester,
            ),
            domain_randao: domain(config.domain_randao, mainnet.domain_randao),
            domain_deposit: domain(config.domain_deposit, mainnet.domain_deposit),
            domain_voluntary_exit: domain(
                config.domain_voluntary_exit,
                mainnet.domain_voluntary_exit,
            ),
            domain_selection_proof: domain(
                config.domain_selection_proof,
                mainnet.domain_selection_proof,
            ),
            domain_aggregate_and_proof: domain(
                config.domain_aggregate_and_proof,
                mainnet.domain_aggregate_and_proof,
            ),
            domain_sync_committee: domain(
                config.domain_sync_committee,
                mainnet.domain_sync_committee,
            ),
            domain_sync_committee_selection_proof: domain(
                config.domain_sync_committee_selection_proof,
                mainnet.domain_sync_committee_selection_proof,
            ),
            domain_contribution_and_proof: domain(
                config.domain_contribution_and_proof,
                mainnet.domain_contribution_and_proof,
            ),
            domain_bls_to_execution_change: domain(
                config.domain_bls_to_execution_change,
                mainnet.domain_bls_to_execution_change,
            ),
            domain_application_mask: domain(
                config.domain_application_mask,
                mainnet.domain_application_mask,
            ),
        })
    }

    /// Get the domain number, unmodified by the fork.
    pub fn get_domain_constant(&self, domain: Domain) -> u32 {
        match domain {
            Domain::BeaconProposer => self.domain_beacon_proposer,
            Domain::BeaconAttester => self.domain_beacon_attester,
            Domain::Randao => self.domain_randao,
            Domain::Deposit => self.domain_deposit,
            Domain::VoluntaryExit => self.domain_voluntary_exit,
            Domain::SelectionProof => self.domain_selection_proof,
            Domain::AggregateAndProof => self.domain_aggregate_and_proof,
            Domain::SyncCommittee => self.domain_sync_committee,
            Domain::ContributionAndProof => self.domain_contribution_and_proof,
            Domain::SyncCommitteeSelectionProof => self.domain_sync_committee_selection_proof,
            Domain::BlsToExecutionChange => self.domain_bls_to_execution_change,
            // The builder is application index 0, so its domain is the mask itself.
            Domain::ApplicationMask(ApplicationDomain::Builder) => self.domain_application_mask,
        }
    }

    /// The on-the-wire bytes of the given domain.
    pub fn get_domain_type(&self, domain: Domain) -> DomainType {
        int_to_bytes4(self.get_domain_constant(domain))
    }

    pub fn fork_version_at_epoch(&self, epoch: Epoch) -> Result<ForkVersion, fork_schedule::Error> {
        self.fork_schedule.fork_version_at_epoch(epoch)
    }
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self::mainnet()
    }
}

/// The subset of a consensus `config.yaml` that affects signing domains.
///
/// Unknown keys are ignored so that full network configs can be read directly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_name: Option<String>,

    #[serde(with = "ethereum_serde_utils::bytes_4_hex")]
    pub genesis_fork_version: ForkVersion,

    #[serde(default, with = "optional_bytes_4_hex")]
    pub altair_fork_version: Option<ForkVersion>,
    #[serde(default)]
    pub altair_fork_epoch: Option<Epoch>,

    #[serde(default, with = "optional_bytes_4_hex")]
    pub bellatrix_fork_version: Option<ForkVersion>,
    #[serde(default)]
    pub bellatrix_fork_epoch: Option<Epoch>,

    #[serde(default, with = "optional_bytes_4_hex")]
    pub capella_fork_version: Option<ForkVersion>,
    #[serde(default)]
    pub capella_fork_epoch: Option<Epoch>,

    #[serde(default, with = "optional_bytes_4_hex")]
    pub deneb_fork_version: Option<ForkVersion>,
    #[serde(default)]
    pub deneb_fork_epoch: Option<Epoch>,

    #[serde(default, with = "optional_bytes_4_hex")]
    pub electra_fork_version: Option<ForkVersion>,
    #[serde(default)]
    pub electra_fork_epoch: Option<Epoch>,

    #[serde(default, with = "optional_bytes_4_hex")]
    pub domain_beacon_proposer: Option<DomainType>,
    #[serde(default, with = "optional_bytes_4_hex")]
    pub domain_beacon_attester: Option<DomainType>,
    #[serde(default, with = "optional_bytes_4_hex")]
    pub domain_randao: Option<DomainType>,
    #[serde(default, with = "optional_bytes_4_hex")]
    pub domain_deposit: Option<DomainType>,
    #[serde(default, with = "optional_bytes_4_hex")]
    pub domain_voluntary_exit: Option<DomainType>,
    #[serde(default, with = "optional_bytes_4_hex")]
    pub domain_selection_proof: Option<DomainType>,
    #[serde(default, with = "optional_bytes_4_hex")]
    pub domain_aggregate_and_proof: Option<DomainType>,
    #[serde(default, with = "optional_bytes_4_hex")]
    pub domain_sync_committee: Option<DomainType>,
    #[serde(default, with = "optional_bytes_4_hex")]
    pub domain_sync_committee_selection_proof: Option<DomainType>,
    #[serde(default, with = "optional_bytes_4_hex")]
    pub domain_contribution_and_proof: Option<DomainType>,
    #[serde(default, with = "optional_bytes_4_hex")]
    pub domain_bls_to_execution_change: Option<DomainType>,
    #[serde(default, with = "optional_bytes_4_hex")]
    pub domain_application_mask: Option<DomainType>,
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, String> {
        serde_yaml::from_str(yaml).map_err(|e| format!("Unable to parse yaml config: {:?}", e))
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        File::open(path)
            .map_err(|e| format!("Unable to open {:?}: {:?}", path, e))
            .and_then(|file| {
                serde_yaml::from_reader(file)
                    .map_err(|e| format!("Unable to parse {:?}: {:?}", path, e))
            })
    }

    /// Builds the fork schedule, skipping forks that are unscheduled.
    pub fn fork_schedule(&self) -> Result<ForkSchedule, fork_schedule::Error> {
        let genesis = ForkScheduleEntry::new(
            ForkName::Base,
            Epoch::new(0),
            self.genesis_fork_version,
        );

        let upgrades = [
            (
                ForkName::Altair,
                self.altair_fork_version,
                self.altair_fork_epoch,
            ),
            (
                ForkName::Bellatrix,
                self.bellatrix_fork_version,
                self.bellatrix_fork_epoch,
            ),
            (
                ForkName::Capella,
                self.capella_fork_version,
                self.capella_fork_epoch,
            ),
            (ForkName::Deneb, self.deneb_fork_version, self.deneb_fork_epoch),
            (
                ForkName::Electra,
                self.electra_fork_version,
                self.electra_fork_epoch,
            ),
        ];

        let forks = std::iter::once(genesis)
            .chain(
                upgrades
                    .into_iter()
                    .filter_map(|(fork_name, version, epoch)| match (version, epoch) {
                        (Some(version), Some(epoch)) if epoch != FAR_FUTURE_EPOCH => {
                            Some(ForkScheduleEntry::new(fork_name, epoch, version))
                        }
                        _ => None,
                    }),
            )
            .collect();

        ForkSchedule::new(forks)
    }
}

/// Serde helpers for `Option<[u8; 4]>` encoded as 0x-prefixed hex.
mod optional_bytes_4_hex {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<[u8; 4]>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(bytes) => ethereum_serde_utils::bytes_4_hex::serialize(bytes, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<[u8; 4]>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|hex| {
                let bytes = ethereum_serde_utils::hex::decode(&hex).map_err(D::Error::custom)?;
                <[u8; 4]>::try_from(bytes.as_slice()).map_err(|_| {
                    D::Error::custom(format!("expected 4 bytes, got {}", bytes.len()))
                })
            })
            .transpose()
    }
}
