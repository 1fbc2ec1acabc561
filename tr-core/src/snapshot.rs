//! Frozen, read-only views of resolved target configurations.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use compact_str::CompactString;
use tr_cfg::{OptionKind, OptionValue, ResolvedLookup, SchemaError, TargetOption};
use tr_ore::hash::Xxh3Hasher;
use tr_types::{Fingerprint, TargetIdentity};

use crate::options::{
    BuildEnvironment, LinkType, BUILD_ENVIRONMENT, LINK_TYPE, OVERRIDE_BUILD_ENVIRONMENT,
};

/// Layer that produced a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueSource {
    /// Constant default of the option.
    Default,
    /// Default computed from other options.
    Derived,
    /// Archetype preset.
    Policy,
    ConfigFile,
    Programmatic,
    CommandLine,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueSource::Default => "default",
            ValueSource::Derived => "derived",
            ValueSource::Policy => "policy",
            ValueSource::ConfigFile => "config",
            ValueSource::Programmatic => "programmatic",
            ValueSource::CommandLine => "command-line",
        };
        f.write_str(name)
    }
}

/// A value and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue {
    pub value: OptionValue,
    pub source: ValueSource,
}

/// Every option of a single target, along with its definitions.
///
/// Built up during resolution and then frozen into a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    identity: TargetIdentity,
    values: BTreeMap<&'static str, ResolvedValue>,
    definitions: Vec<CompactString>,
    project_definitions: Vec<CompactString>,
    /// Options that must match within a shared build environment, in declaration order.
    environment_critical: Vec<&'static str>,
    diagnostics: Vec<String>,
}

impl ResolvedConfiguration {
    pub fn new(identity: TargetIdentity, environment_critical: Vec<&'static str>) -> Self {
        ResolvedConfiguration {
            identity,
            values: BTreeMap::new(),
            definitions: Vec::new(),
            project_definitions: Vec::new(),
            environment_critical,
            diagnostics: Vec::new(),
        }
    }

    pub fn insert(&mut self, name: &'static str, value: OptionValue, source: ValueSource) {
        self.values.insert(name, ResolvedValue { value, source });
    }

    pub fn set_definitions(
        &mut self,
        definitions: Vec<CompactString>,
        project_definitions: Vec<CompactString>,
    ) {
        self.definitions = definitions;
        self.project_definitions = project_definitions;
    }

    pub fn push_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics.push(message.into());
    }

    pub fn identity(&self) -> &TargetIdentity {
        &self.identity
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedValue> {
        self.values.get(name)
    }
}

impl ResolvedLookup for ResolvedConfiguration {
    fn lookup(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name).map(|resolved| &resolved.value)
    }
}

/// Immutable, cheaply clonable view of a [`ResolvedConfiguration`].
#[derive(Debug, Clone)]
pub struct Snapshot {
    inner: Arc<SnapshotInner>,
}

#[derive(Debug)]
struct SnapshotInner {
    resolved: ResolvedConfiguration,
    fingerprint: Fingerprint,
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner.resolved == other.inner.resolved
    }
}

impl Eq for Snapshot {}

impl Snapshot {
    /// Freeze a [`ResolvedConfiguration`].
    pub fn new(resolved: ResolvedConfiguration) -> Self {
        let mut hasher = Xxh3Hasher::new();
        for name in &resolved.environment_critical {
            let Some(value) = resolved.lookup(name) else {
                continue;
            };
            hasher.update_field(name.as_bytes());
            value.hash_into(&mut hasher);
        }
        let fingerprint = hasher.digest();

        Snapshot {
            inner: Arc::new(SnapshotInner {
                resolved,
                fingerprint,
            }),
        }
    }

    pub fn identity(&self) -> &TargetIdentity {
        &self.inner.resolved.identity
    }

    pub fn name(&self) -> &str {
        self.identity().name()
    }

    /// Value of the option named `name`.
    pub fn get(&self, name: &str) -> Result<&OptionValue, SchemaError> {
        self.resolved_value(name).map(|resolved| &resolved.value)
    }

    /// Layer that produced the value of option `name`.
    pub fn source(&self, name: &str) -> Result<ValueSource, SchemaError> {
        self.resolved_value(name).map(|resolved| resolved.source)
    }

    pub fn resolved_value(&self, name: &str) -> Result<&ResolvedValue, SchemaError> {
        self.inner
            .resolved
            .get(name)
            .ok_or_else(|| SchemaError::UnknownOption {
                name: CompactString::new(name),
            })
    }

    /// Typed read of `option`.
    pub fn read<V: OptionKind>(&self, option: &TargetOption<V>) -> Result<V, SchemaError> {
        option.read_from(&self.inner.resolved)
    }

    /// Preprocessor definitions for every module of the target.
    pub fn definitions(&self) -> &[CompactString] {
        &self.inner.resolved.definitions
    }

    /// Preprocessor definitions for modules that belong to the project.
    pub fn project_definitions(&self) -> &[CompactString] {
        &self.inner.resolved.project_definitions
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.inner.resolved.diagnostics
    }

    pub fn link_type(&self) -> Result<LinkType, SchemaError> {
        self.read(&LINK_TYPE)
    }

    pub fn build_environment(&self) -> Result<BuildEnvironment, SchemaError> {
        self.read(&BUILD_ENVIRONMENT)
    }

    /// Whether conflicts in this target's build environment are only warnings.
    pub fn overrides_build_environment(&self) -> bool {
        self.read(&OVERRIDE_BUILD_ENVIRONMENT).unwrap_or(false)
    }

    /// Environment critical options and their values, in declaration order.
    pub fn environment_critical(&self) -> impl Iterator<Item = (&'static str, &OptionValue)> + '_ {
        let resolved = &self.inner.resolved;
        resolved
            .environment_critical
            .iter()
            .filter_map(|name| resolved.lookup(name).map(|value| (*name, value)))
    }

    /// Hash of the environment critical values, equal fingerprints can share an environment.
    pub fn fingerprint(&self) -> Fingerprint {
        self.inner.fingerprint
    }

    /// Every option, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ResolvedValue)> + '_ {
        self.inner
            .resolved
            .values
            .iter()
            .map(|(name, resolved)| (*name, resolved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tr_types::{Architecture, ArchitectureSet, Archetype, Configuration, PlatformId};

    fn resolved(name: &str, static_crt: bool) -> ResolvedConfiguration {
        let identity = TargetIdentity::new(
            name,
            Archetype::Editor,
            PlatformId::new("Linux"),
            Configuration::Development,
            ArchitectureSet::single(Architecture::X86_64),
        );
        let mut resolved = ResolvedConfiguration::new(identity, vec!["use_static_crt"]);
        resolved.insert("link_type", OptionValue::enum_variant("modular"), ValueSource::Policy);
        resolved.insert(
            "build_environment",
            OptionValue::enum_variant("shared"),
            ValueSource::Derived,
        );
        resolved.insert(
            "use_static_crt",
            OptionValue::Bool(static_crt),
            ValueSource::ConfigFile,
        );
        resolved
    }

    #[test]
    fn smoketest_accessors() {
        let snapshot = Snapshot::new(resolved("ShooterEditor", true));
        assert_eq!(snapshot.name(), "ShooterEditor");
        assert_eq!(snapshot.link_type(), Ok(LinkType::Modular));
        assert_eq!(snapshot.build_environment(), Ok(BuildEnvironment::Shared));
        assert_eq!(snapshot.source("use_static_crt"), Ok(ValueSource::ConfigFile));
        assert!(!snapshot.overrides_build_environment());

        let critical: Vec<_> = snapshot.environment_critical().collect();
        assert_eq!(critical, [("use_static_crt", &OptionValue::Bool(true))]);

        let names: Vec<_> = snapshot.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["build_environment", "link_type", "use_static_crt"]);
    }

    #[test]
    fn unknown_options_are_errors() {
        let snapshot = Snapshot::new(resolved("ShooterEditor", true));
        for name in ["nope", "", "USE_STATIC_CRT"] {
            assert_eq!(
                snapshot.get(name),
                Err(SchemaError::UnknownOption { name: name.into() })
            );
        }
        assert!(snapshot.read(&OVERRIDE_BUILD_ENVIRONMENT).is_err());
    }

    #[test]
    fn snapshots_of_the_same_resolution_are_equal() {
        let first = Snapshot::new(resolved("ShooterEditor", true));
        let later = Snapshot::new(resolved("ShooterEditor", true));
        let clone = first.clone();

        assert_eq!(first, later);
        assert_eq!(first, clone);
        assert_eq!(first.fingerprint(), later.fingerprint());
    }

    #[test]
    fn fingerprint_tracks_critical_values() {
        let a = Snapshot::new(resolved("A", true));
        let b = Snapshot::new(resolved("B", true));
        let c = Snapshot::new(resolved("C", false));

        // Same critical values, different targets.
        assert_ne!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
