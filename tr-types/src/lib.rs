//! Types used throughout `tr`.
//!
//! The goal of this crate is to be very lightweight, so take care with adding dependencies.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use compact_str::CompactString;
use smallvec::SmallVec;

pub use target_lexicon::Architecture;

/// Broad category of a target, drives the archetype baseline during resolution.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Archetype {
    Game,
    Editor,
    Client,
    Server,
    Program,
    Test,
}

impl Archetype {
    pub const VARIANTS: &'static [&'static str] =
        &["game", "editor", "client", "server", "program", "test"];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Archetype::Game => "game",
            Archetype::Editor => "editor",
            Archetype::Client => "client",
            Archetype::Server => "server",
            Archetype::Program => "program",
            Archetype::Test => "test",
        }
    }
}

impl FromStr for Archetype {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let archetype = match s.to_ascii_lowercase().as_str() {
            "game" => Archetype::Game,
            "editor" => Archetype::Editor,
            "client" => Archetype::Client,
            "server" => Archetype::Server,
            "program" => Archetype::Program,
            "test" => Archetype::Test,
            _ => return Err(ParseError::new("archetype", s)),
        };
        Ok(archetype)
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build configuration, e.g. `development` or `shipping`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Configuration {
    Debug,
    DebugGame,
    Development,
    Shipping,
    Test,
}

impl Configuration {
    pub const VARIANTS: &'static [&'static str] =
        &["debug", "debug_game", "development", "shipping", "test"];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Configuration::Debug => "debug",
            Configuration::DebugGame => "debug_game",
            Configuration::Development => "development",
            Configuration::Shipping => "shipping",
            Configuration::Test => "test",
        }
    }

    /// Returns true for configurations that ship to end users.
    pub const fn is_release(&self) -> bool {
        matches!(self, Configuration::Shipping | Configuration::Test)
    }
}

impl FromStr for Configuration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let configuration = match s.to_ascii_lowercase().as_str() {
            "debug" => Configuration::Debug,
            "debug_game" | "debuggame" => Configuration::DebugGame,
            "development" => Configuration::Development,
            "shipping" => Configuration::Shipping,
            "test" => Configuration::Test,
            _ => return Err(ParseError::new("configuration", s)),
        };
        Ok(configuration)
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of a platform, e.g. `Linux` or `Win64`.
///
/// Platforms are an open set, the ones that are actually buildable are registered at runtime.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlatformId(CompactString);

impl PlatformId {
    pub fn new(name: impl Into<CompactString>) -> Self {
        PlatformId(name.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized set of CPU architectures a target builds for.
///
/// Architectures are kept sorted by name and de-duplicated so two sets with the same members
/// always compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ArchitectureSet {
    inner: SmallVec<[Architecture; 2]>,
}

impl ArchitectureSet {
    pub fn new(archs: impl IntoIterator<Item = Architecture>) -> Self {
        let mut inner: SmallVec<[Architecture; 2]> = archs.into_iter().collect();
        inner.sort_by_cached_key(|arch| arch.to_string());
        inner.dedup();
        ArchitectureSet { inner }
    }

    pub fn single(arch: Architecture) -> Self {
        ArchitectureSet::new([arch])
    }

    pub fn contains(&self, arch: &Architecture) -> bool {
        self.inner.contains(arch)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Architecture> {
        self.inner.iter()
    }

    /// Returns true if every architecture in `self` is also in `other`.
    pub fn is_subset(&self, other: &ArchitectureSet) -> bool {
        self.inner.iter().all(|arch| other.contains(arch))
    }
}

impl PartialOrd for ArchitectureSet {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ArchitectureSet {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let names = |set: &ArchitectureSet| -> SmallVec<[String; 2]> {
            set.inner.iter().map(|arch| arch.to_string()).collect()
        };
        names(self).cmp(&names(other))
    }
}

impl fmt::Display for ArchitectureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, arch) in self.inner.iter().enumerate() {
            if idx > 0 {
                f.write_str("+")?;
            }
            write!(f, "{arch}")?;
        }
        Ok(())
    }
}

/// Immutable description of what a target is, independent of how it gets configured.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetIdentity {
    name: CompactString,
    archetype: Archetype,
    platform: PlatformId,
    configuration: Configuration,
    architectures: ArchitectureSet,
    /// Project file the target belongs to, `None` for engine targets.
    project: Option<PathBuf>,
    /// Name of the target rules constructor, if any.
    rules: Option<CompactString>,
}

impl TargetIdentity {
    pub fn new(
        name: impl Into<CompactString>,
        archetype: Archetype,
        platform: PlatformId,
        configuration: Configuration,
        architectures: ArchitectureSet,
    ) -> Self {
        TargetIdentity {
            name: name.into(),
            archetype,
            platform,
            configuration,
            architectures,
            project: None,
            rules: None,
        }
    }

    pub fn with_project(mut self, project: impl Into<PathBuf>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_rules(mut self, rules: impl Into<CompactString>) -> Self {
        self.rules = Some(rules.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    pub fn platform(&self) -> &PlatformId {
        &self.platform
    }

    pub fn configuration(&self) -> Configuration {
        self.configuration
    }

    pub fn architectures(&self) -> &ArchitectureSet {
        &self.architectures
    }

    pub fn project(&self) -> Option<&Path> {
        self.project.as_deref()
    }

    pub fn rules(&self) -> Option<&str> {
        self.rules.as_deref()
    }
}

impl fmt::Display for TargetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} {} {} {})",
            self.name, self.archetype, self.platform, self.configuration, self.architectures
        )
    }
}

/// Summary of a single module, as much as target resolution needs to know about it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleInfo {
    pub public_dependencies: Vec<CompactString>,
    pub private_dependencies: Vec<CompactString>,
    /// Module may be used to generate a shared precompiled header.
    pub wants_shared_pch: bool,
    pub can_hot_reload: bool,
}

/// Read-only view of the modules participating in a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleGraph {
    modules: BTreeMap<CompactString, ModuleInfo>,
}

impl ModuleGraph {
    pub fn insert(&mut self, name: impl Into<CompactString>, info: ModuleInfo) -> Option<ModuleInfo> {
        self.modules.insert(name.into(), info)
    }

    pub fn get(&self, name: &str) -> Option<&ModuleInfo> {
        self.modules.get(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModuleInfo)> {
        self.modules.iter().map(|(name, info)| (name.as_str(), info))
    }

    pub fn any_wants_shared_pch(&self) -> bool {
        self.modules.values().any(|info| info.wants_shared_pch)
    }

    pub fn any_can_hot_reload(&self) -> bool {
        self.modules.values().any(|info| info.can_hot_reload)
    }
}

/// What a registered platform is able to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSupport {
    pub platform: PlatformId,
    pub configurations: Vec<Configuration>,
    pub architectures: ArchitectureSet,
    pub default_toolchain: CompactString,
}

impl PlatformSupport {
    pub fn supports_configuration(&self, configuration: Configuration) -> bool {
        self.configurations.contains(&configuration)
    }

    pub fn supports_architectures(&self, archs: &ArchitectureSet) -> bool {
        archs.is_subset(&self.architectures)
    }

    /// Architecture used when a target does not name any.
    pub fn default_architecture(&self) -> Option<&Architecture> {
        self.architectures.iter().next()
    }
}

/// Stable digest of a resolved configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub const fn new(val: u64) -> Self {
        Fingerprint(val)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Error returned when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: &'static str,
    value: CompactString,
}

impl ParseError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        ParseError {
            kind,
            value: CompactString::new(value),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoketest_parse_enums() {
        assert_eq!("Editor".parse::<Archetype>().unwrap(), Archetype::Editor);
        assert_eq!(
            "DebugGame".parse::<Configuration>().unwrap(),
            Configuration::DebugGame
        );
        let err = "Toaster".parse::<Archetype>().unwrap_err();
        assert_eq!(err.to_string(), "unknown archetype 'Toaster'");
    }

    #[test]
    fn architecture_sets_are_normalized() {
        let a = ArchitectureSet::new([Architecture::X86_64, Architecture::X86_64]);
        let b = ArchitectureSet::single(Architecture::X86_64);
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), std::cmp::Ordering::Equal);
        assert_eq!(a.to_string(), "x86_64");
    }

    #[test]
    fn identity_display() {
        let identity = TargetIdentity::new(
            "ShooterEditor",
            Archetype::Editor,
            PlatformId::new("Linux"),
            Configuration::Development,
            ArchitectureSet::single(Architecture::X86_64),
        );
        assert_eq!(
            identity.to_string(),
            "ShooterEditor (editor Linux development x86_64)"
        );
        assert_eq!(identity.project(), None);
        assert_eq!(identity.rules(), None);
    }

    #[test]
    fn module_graph_queries() {
        let mut graph = ModuleGraph::default();
        assert!(!graph.any_wants_shared_pch());

        graph.insert(
            "Core",
            ModuleInfo {
                wants_shared_pch: true,
                ..Default::default()
            },
        );
        assert!(graph.any_wants_shared_pch());
        assert!(!graph.any_can_hot_reload());
        assert_eq!(graph.len(), 1);
    }
}
