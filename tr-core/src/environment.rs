//! Grouping targets into build environments.

use std::collections::BTreeMap;
use std::fmt;

use compact_str::CompactString;
use tr_types::{Archetype, ArchitectureSet, Configuration, PlatformId};

use crate::options::{BuildEnvironment, LinkType};
use crate::snapshot::Snapshot;

/// Identifies a build environment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnvironmentKey {
    /// Shared by every modular target building the same platform, configuration and
    /// architectures.
    Shared {
        platform: PlatformId,
        configuration: Configuration,
        architectures: ArchitectureSet,
    },
    /// Owned by a single target.
    Unique { target: CompactString },
}

impl EnvironmentKey {
    /// Returns the key of the environment `snapshot` builds in.
    pub fn for_snapshot(snapshot: &Snapshot) -> Self {
        let identity = snapshot.identity();
        let shared = snapshot.build_environment() == Ok(BuildEnvironment::Shared)
            && snapshot.link_type() != Ok(LinkType::Monolithic)
            && identity.archetype() != Archetype::Program;

        if shared {
            EnvironmentKey::Shared {
                platform: identity.platform().clone(),
                configuration: identity.configuration(),
                architectures: identity.architectures().clone(),
            }
        } else {
            EnvironmentKey::Unique {
                target: CompactString::new(identity.name()),
            }
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, EnvironmentKey::Shared { .. })
    }
}

impl fmt::Display for EnvironmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvironmentKey::Shared {
                platform,
                configuration,
                architectures,
            } => write!(f, "shared({platform} {configuration} {architectures})"),
            EnvironmentKey::Unique { target } => write!(f, "unique({target})"),
        }
    }
}

/// Targets building in the same environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentGroup {
    key: EnvironmentKey,
    /// Sorted by target name.
    members: Vec<Snapshot>,
}

impl EnvironmentGroup {
    pub fn new(key: EnvironmentKey, mut members: Vec<Snapshot>) -> Self {
        members.sort_by(|a, b| a.name().cmp(b.name()));
        EnvironmentGroup { key, members }
    }

    pub fn key(&self) -> &EnvironmentKey {
        &self.key
    }

    pub fn members(&self) -> &[Snapshot] {
        &self.members
    }
}

/// Partition `snapshots` into build environments, ordered by key.
pub fn group(snapshots: &[Snapshot]) -> Vec<EnvironmentGroup> {
    let mut groups: BTreeMap<EnvironmentKey, Vec<Snapshot>> = BTreeMap::new();
    for snapshot in snapshots {
        groups
            .entry(EnvironmentKey::for_snapshot(snapshot))
            .or_default()
            .push(snapshot.clone());
    }
    groups
        .into_iter()
        .map(|(key, members)| EnvironmentGroup::new(key, members))
        .collect()
}
