//! Fetches the genesis validators root from a beacon node once and serves it from memory
//! thereafter.
//!
//! The root is fixed at genesis, so a successful fetch is never repeated. Failed fetches and
//! malformed roots are *not* cached: the next caller will ask the provider again.

use crate::Hash256;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use slog::{debug, info, Logger};
use std::fmt;
use tokio::sync::OnceCell;

/// Length of a `0x`-prefixed, hex-encoded 32-byte root.
pub const GENESIS_VALIDATORS_ROOT_HEX_LEN: usize = 2 + 2 * 32;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The genesis provider returned an error.
    Fetch(String),
    /// The provider returned a root which is not `0x`-prefixed, 32-byte hex.
    InvalidRootFormat(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Fetch(e) => write!(f, "failed to get genesis info: {}", e),
            Error::InvalidRootFormat(raw) => write!(f, "invalid genesis validators root: {}", raw),
        }
    }
}

/// The parts of `GET /eth/v1/beacon/genesis` used for signing.
///
/// The root is kept as the raw string received so that a malformed value can be reported
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenesisData {
    pub genesis_validators_root: String,
}

/// A source of genesis information, usually a beacon node.
#[async_trait]
pub trait GenesisProvider: Send + Sync {
    type Error: fmt::Display + Send;

    async fn get_genesis(&self) -> Result<GenesisData, Self::Error>;
}

/// Decode a `0x`-prefixed hex string into a 32-byte root.
pub fn parse_genesis_validators_root(raw: &str) -> Result<Hash256, Error> {
    let invalid = || Error::InvalidRootFormat(raw.to_string());

    if raw.len() != GENESIS_VALIDATORS_ROOT_HEX_LEN {
        return Err(invalid());
    }

    let stripped = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(invalid)?;

    let mut root = [0; 32];
    hex::decode_to_slice(stripped, &mut root).map_err(|_| invalid())?;

    Ok(Hash256::from(root))
}

pub struct GenesisInfoCache<P> {
    provider: P,
    genesis_validators_root: OnceCell<Hash256>,
    log: Logger,
}

impl<P: GenesisProvider> GenesisInfoCache<P> {
    pub fn new(provider: P, log: Logger) -> Self {
        Self {
            provider,
            genesis_validators_root: OnceCell::new(),
            log,
        }
    }

    /// Returns the genesis validators root, fetching it from the provider on first use.
    ///
    /// Concurrent callers share a single in-flight fetch.
    pub async fn genesis_validators_root(&self) -> Result<Hash256, Error> {
        self.genesis_validators_root
            .get_or_try_init(|| self.fetch_genesis_validators_root())
            .await
            .copied()
    }

    /// Returns the root if it has already been fetched, without contacting the provider.
    pub fn cached_genesis_validators_root(&self) -> Option<Hash256> {
        self.genesis_validators_root.get().copied()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    async fn fetch_genesis_validators_root(&self) -> Result<Hash256, Error> {
        debug!(self.log, "Fetching genesis validators root");

        let genesis = self
            .provider
            .get_genesis()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;

        let root = parse_genesis_validators_root(&genesis.genesis_validators_root)?;

        info!(
            self.log,
            "Cached genesis validators root";
            "genesis_validators_root" => ?root,
        );

        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "0xcf8e0d4e9587369b2301d0790347320302cc0943d5a1884560367e8208d920f2";

    #[test]
    fn parses_valid_root() {
        let root = parse_genesis_validators_root(ROOT).unwrap();
        assert_eq!(format!("0x{}", hex::encode(root.as_bytes())), ROOT);
    }

    #[test]
    fn parses_mixed_case() {
        let upper = format!("0x{}", ROOT[2..].to_uppercase());
        assert_eq!(
            parse_genesis_validators_root(&upper),
            parse_genesis_validators_root(ROOT)
        );
    }

    #[test]
    fn rejects_malformed_roots() {
        let missing_prefix = format!("{}00", &ROOT[2..]);
        let short = &ROOT[..64];
        let long = format!("{}00", ROOT);
        let not_hex = format!("0x{}", "zz".repeat(32));

        for raw in [
            "foo",
            "",
            "0x",
            missing_prefix.as_str(),
            short,
            long.as_str(),
            not_hex.as_str(),
        ] {
            assert_eq!(
                parse_genesis_validators_root(raw),
                Err(Error::InvalidRootFormat(raw.to_string()))
            );
        }
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            Error::InvalidRootFormat("foo".into()).to_string(),
            "invalid genesis validators root: foo"
        );
        assert!(Error::Fetch("timeout".into())
            .to_string()
            .starts_with("failed to get genesis info"));
    }

    #[test]
    fn genesis_data_from_beacon_api_json() {
        let json = format!(
            r#"{{"genesis_time":"1606824023","genesis_validators_root":"{}","genesis_fork_version":"0x00000000"}}"#,
            ROOT
        );
        let data: GenesisData = serde_json::from_str(&json).unwrap();
        assert_eq!(data.genesis_validators_root, ROOT);
    }
}
