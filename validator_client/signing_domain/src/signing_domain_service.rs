use crate::chain_spec::ChainSpec;
use crate::domain::{compute_domain, Domain, DomainType};
use crate::genesis::{self, GenesisInfoCache, GenesisProvider};
use crate::{fork_schedule, Epoch, Hash256};
use slog::{crit, Logger};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The genesis validators root could not be obtained.
    Genesis(genesis::Error),
    /// No fork version applies to the requested epoch.
    ForkSchedule(fork_schedule::Error),
}

impl From<genesis::Error> for Error {
    fn from(e: genesis::Error) -> Self {
        Error::Genesis(e)
    }
}

impl From<fork_schedule::Error> for Error {
    fn from(e: fork_schedule::Error) -> Self {
        Error::ForkSchedule(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Genesis(e) => write!(f, "unable to resolve genesis validators root: {}", e),
            Error::ForkSchedule(e) => write!(f, "misconfigured fork schedule: {}", e),
        }
    }
}

impl std::error::Error for Error {}

/// Computes the signing domain for any message a validator signs.
pub struct SigningDomainService<P> {
    genesis: GenesisInfoCache<P>,
    spec: Arc<ChainSpec>,
    log: Logger,
}

impl<P: GenesisProvider> SigningDomainService<P> {
    pub fn new(genesis_provider: P, spec: Arc<ChainSpec>, log: Logger) -> Self {
        Self {
            genesis: GenesisInfoCache::new(genesis_provider, log.clone()),
            spec,
            log,
        }
    }

    /// Returns the 32-byte signing domain for `domain_type` at `epoch`.
    ///
    /// The genesis validators root is fetched from the provider on the first successful call
    /// only.
    pub async fn get_domain_data(
        &self,
        epoch: Epoch,
        domain_type: DomainType,
    ) -> Result<Hash256, Error> {
        let genesis_validators_root = self.genesis.genesis_validators_root().await?;

        let fork_version = self
            .spec
            .fork_version_at_epoch(epoch)
            .map_err(|e| {
                crit!(
                    self.log,
                    "No fork version for epoch";
                    "error" => %e,
                    "epoch" => epoch,
                    "config_name" => ?self.spec.config_name,
                );
                e
            })?;

        Ok(compute_domain(
            domain_type,
            fork_version,
            genesis_validators_root,
        ))
    }

    /// As `get_domain_data`, resolving the domain type from the `ChainSpec`.
    pub async fn get_domain(&self, epoch: Epoch, domain: Domain) -> Result<Hash256, Error> {
        self.get_domain_data(epoch, self.spec.get_domain_type(domain))
            .await
    }

    pub fn genesis_validators_root(&self) -> Option<Hash256> {
        self.genesis.cached_genesis_validators_root()
    }

    pub fn spec(&self) -> &ChainSpec {
        &self.spec
    }

    pub fn genesis_provider(&self) -> &P {
        self.genesis.provider()
    }
}
