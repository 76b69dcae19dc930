//! Maps an epoch to the fork version that is active at that epoch.
//!
//! The schedule is configuration: it is built once from a `ChainSpec` (or a `config.yaml`) and
//! never mutated afterwards. Failing to find a fork for an epoch indicates a misconfigured
//! deployment rather than a transient condition.

use crate::{Epoch, ForkName, ForkVersion};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The schedule contains no forks at all.
    EmptySchedule,
    /// Activation epochs must never decrease.
    UnorderedSchedule {
        previous: ForkName,
        previous_epoch: Epoch,
        fork: ForkName,
        epoch: Epoch,
    },
    /// The requested epoch is prior to the first fork in the schedule.
    NoForkAtEpoch { epoch: Epoch, genesis_epoch: Epoch },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::EmptySchedule => write!(f, "fork schedule is empty"),
            Error::UnorderedSchedule {
                previous,
                previous_epoch,
                fork,
                epoch,
            } => write!(
                f,
                "fork schedule is not ordered: {} at epoch {} follows {} at epoch {}",
                fork, epoch, previous, previous_epoch
            ),
            Error::NoForkAtEpoch {
                epoch,
                genesis_epoch,
            } => write!(
                f,
                "fork schedule has no fork at epoch {}, first fork activates at epoch {}",
                epoch, genesis_epoch
            ),
        }
    }
}

/// A single row of the fork schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkScheduleEntry {
    pub fork_name: ForkName,
    pub epoch: Epoch,
    #[serde(with = "ethereum_serde_utils::bytes_4_hex")]
    pub version: ForkVersion,
}

impl ForkScheduleEntry {
    pub fn new(fork_name: ForkName, epoch: Epoch, version: ForkVersion) -> Self {
        Self {
            fork_name,
            epoch,
            version,
        }
    }
}

/// An ordered, non-empty table of `(activation epoch, fork version)` pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ForkSchedule {
    forks: Vec<ForkScheduleEntry>,
}

impl ForkSchedule {
    /// Builds a schedule, checking that it is non-empty and ordered by epoch.
    ///
    /// Several forks may share an activation epoch; the last one listed is active from then.
    pub fn new(forks: Vec<ForkScheduleEntry>) -> Result<Self, Error> {
        if forks.is_empty() {
            return Err(Error::EmptySchedule);
        }

        for pair in forks.windows(2) {
            let (previous, next) = (&pair[0], &pair[1]);
            if next.epoch < previous.epoch {
                return Err(Error::UnorderedSchedule {
                    previous: previous.fork_name,
                    previous_epoch: previous.epoch,
                    fork: next.fork_name,
                    epoch: next.epoch,
                });
            }
        }

        Ok(Self { forks })
    }

    /// The mainnet schedule, `phase0` through `electra`.
    pub fn mainnet() -> Self {
        Self {
            forks: vec![
                ForkScheduleEntry::new(ForkName::Base, Epoch::new(0), [0x00, 0x00, 0x00, 0x00]),
                ForkScheduleEntry::new(
                    ForkName::Altair,
                    Epoch::new(74_240),
                    [0x01, 0x00, 0x00, 0x00],
                ),
                ForkScheduleEntry::new(
                    ForkName::Bellatrix,
                    Epoch::new(144_896),
                    [0x02, 0x00, 0x00, 0x00],
                ),
                ForkScheduleEntry::new(
                    ForkName::Capella,
                    Epoch::new(194_048),
                    [0x03, 0x00, 0x00, 0x00],
                ),
                ForkScheduleEntry::new(
                    ForkName::Deneb,
                    Epoch::new(269_568),
                    [0x04, 0x00, 0x00, 0x00],
                ),
                ForkScheduleEntry::new(
                    ForkName::Electra,
                    Epoch::new(364_032),
                    [0x05, 0x00, 0x00, 0x00],
                ),
            ],
        }
    }

    /// Returns the latest entry whose activation epoch is `<= epoch`.
    pub fn fork_at_epoch(&self, epoch: Epoch) -> Result<&ForkScheduleEntry, Error> {
        // Entries are sorted, so the first entry past `epoch` bounds the search.
        let active = self.forks.partition_point(|fork| fork.epoch <= epoch);

        active
            .checked_sub(1)
            .and_then(|index| self.forks.get(index))
            .ok_or_else(|| Error::NoForkAtEpoch {
                epoch,
                genesis_epoch: self.genesis().epoch,
            })
    }

    pub fn fork_version_at_epoch(&self, epoch: Epoch) -> Result<ForkVersion, Error> {
        self.fork_at_epoch(epoch).map(|fork| fork.version)
    }

    /// Returns the activation entry for `fork_name`, if it is scheduled.
    pub fn fork_for_name(&self, fork_name: ForkName) -> Option<&ForkScheduleEntry> {
        self.forks.iter().find(|fork| fork.fork_name == fork_name)
    }

    /// The first entry of the schedule.
    pub fn genesis(&self) -> &ForkScheduleEntry {
        // `new` rejects empty schedules and `mainnet` is non-empty.
        &self.forks[0]
    }

    pub fn forks(&self) -> &[ForkScheduleEntry] {
        &self.forks
    }
}

impl<'de> Deserialize<'de> for ForkSchedule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let forks = Vec::<ForkScheduleEntry>::deserialize(deserializer)?;
        ForkSchedule::new(forks).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(fork_name: ForkName, epoch: u64, version: u8) -> ForkScheduleEntry {
        ForkScheduleEntry::new(fork_name, Epoch::new(epoch), [version, 0, 0, 0])
    }

    #[test]
    fn mainnet_boundaries() {
        let schedule = ForkSchedule::mainnet();

        assert_eq!(schedule.fork_version_at_epoch(Epoch::new(0)), Ok([0, 0, 0, 0]));
        assert_eq!(
            schedule.fork_version_at_epoch(Epoch::new(74_239)),
            Ok([0, 0, 0, 0])
        );
        assert_eq!(
            schedule.fork_version_at_epoch(Epoch::new(74_240)),
            Ok([1, 0, 0, 0])
        );
        assert_eq!(
            schedule.fork_version_at_epoch(Epoch::new(194_047)),
            Ok([2, 0, 0, 0])
        );
        assert_eq!(
            schedule.fork_at_epoch(Epoch::new(269_568)).map(|f| f.fork_name),
            Ok(ForkName::Deneb)
        );
        assert_eq!(
            schedule.fork_at_epoch(Epoch::max_value()).map(|f| f.fork_name),
            Ok(ForkName::Electra)
        );
    }

    #[test]
    fn mainnet_is_valid() {
        let schedule = ForkSchedule::mainnet();
        assert_eq!(ForkSchedule::new(schedule.forks().to_vec()), Ok(schedule));
    }

    #[test]
    fn rejects_empty_schedule() {
        assert_eq!(ForkSchedule::new(vec![]), Err(Error::EmptySchedule));
    }

    #[test]
    fn rejects_unordered_schedule() {
        let result = ForkSchedule::new(vec![
            entry(ForkName::Base, 0, 0),
            entry(ForkName::Altair, 10, 1),
            entry(ForkName::Bellatrix, 9, 2),
        ]);

        assert_eq!(
            result,
            Err(Error::UnorderedSchedule {
                previous: ForkName::Altair,
                previous_epoch: Epoch::new(10),
                fork: ForkName::Bellatrix,
                epoch: Epoch::new(9),
            })
        );
    }

    #[test]
    fn forks_sharing_an_epoch() {
        let schedule = ForkSchedule::new(vec![
            entry(ForkName::Base, 0, 0),
            entry(ForkName::Altair, 0, 1),
            entry(ForkName::Bellatrix, 0, 2),
            entry(ForkName::Capella, 256, 3),
            entry(ForkName::Deneb, 256, 4),
        ])
        .unwrap();

        assert_eq!(
            schedule.fork_at_epoch(Epoch::new(0)).map(|f| f.fork_name),
            Ok(ForkName::Bellatrix)
        );
        assert_eq!(
            schedule.fork_version_at_epoch(Epoch::new(255)),
            Ok([2, 0, 0, 0])
        );
        assert_eq!(
            schedule.fork_version_at_epoch(Epoch::new(256)),
            Ok([4, 0, 0, 0])
        );
        assert_eq!(schedule.genesis().fork_name, ForkName::Base);
    }

    #[test]
    fn epoch_before_first_fork() {
        let schedule = ForkSchedule::new(vec![
            entry(ForkName::Altair, 5, 1),
            entry(ForkName::Bellatrix, 10, 2),
        ])
        .unwrap();

        let err = schedule.fork_version_at_epoch(Epoch::new(4)).unwrap_err();
        assert_eq!(
            err,
            Error::NoForkAtEpoch {
                epoch: Epoch::new(4),
                genesis_epoch: Epoch::new(5),
            }
        );
        assert!(err.to_string().contains("fork schedule"));
        assert_eq!(schedule.fork_version_at_epoch(Epoch::new(5)), Ok([1, 0, 0, 0]));
    }

    #[test]
    fn single_entry_schedule() {
        let schedule = ForkSchedule::new(vec![entry(ForkName::Base, 0, 7)]).unwrap();
        assert_eq!(
            schedule.fork_version_at_epoch(Epoch::max_value()),
            Ok([7, 0, 0, 0])
        );
        assert_eq!(schedule.fork_for_name(ForkName::Altair), None);
    }

    #[test]
    fn deserialize_validates() {
        let yaml = r#"
- fork_name: phase0
  epoch: 0
  version: "0x00000001"
- fork_name: altair
  epoch: 10
  version: "0x01000001"
- fork_name: bellatrix
  epoch: 5
  version: "0x02000001"
"#;
        assert!(serde_yaml::from_str::<ForkSchedule>(yaml).is_err());

        let yaml = r#"
- fork_name: phase0
  epoch: 0
  version: "0x00000001"
- fork_name: altair
  epoch: 36660
  version: "0x01000001"
"#;
        let schedule: ForkSchedule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            schedule.fork_version_at_epoch(Epoch::new(36_660)),
            Ok([0x01, 0x00, 0x00, 0x01])
        );

        let reencoded = serde_yaml::to_string(&schedule).unwrap();
        assert_eq!(serde_yaml::from_str::<ForkSchedule>(&reencoded).unwrap(), schedule);
    }
}
