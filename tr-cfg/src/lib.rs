//! Declarative schema of the options a target can be configured with.
//!
//! Every option is declared once, as a `static`, with its type, its default and the places it
//! may be set from. A [`Schema`] collects the declarations and works out the order defaults have
//! to be computed in.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use compact_str::CompactString;
use derivative::Derivative;
use tr_types::{ModuleGraph, PlatformSupport, TargetIdentity};

mod schema;
mod value;

pub use schema::{Schema, SchemaBuilder};
pub use value::{LIST_SEPARATOR, OptionKind, OptionValue, StaticValue, ValueType};

bitflags::bitflags! {
    /// Layers an option is allowed to be set from.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Sources: u8 {
        const CONFIG_FILE = 0b0001;
        const PROGRAMMATIC = 0b0010;
        const COMMAND_LINE = 0b0100;
    }
}

/// How an option is spelled on the command line.
///
/// Flags are matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliFlag {
    /// A bare flag that sets the option to a fixed value, e.g. `-Monolithic`.
    Switch {
        flag: &'static str,
        value: &'static str,
    },
    /// A flag carrying its value, e.g. `-OptimizationLevel=Size`. The flag includes the
    /// separator.
    ///
    /// With a list `separator` one argument can carry several items, e.g. `-EnablePlugin=A+B`.
    Value {
        flag: &'static str,
        separator: Option<char>,
    },
}

impl CliFlag {
    pub const fn switch(flag: &'static str, value: &'static str) -> Self {
        CliFlag::Switch { flag, value }
    }

    pub const fn value(flag: &'static str) -> Self {
        CliFlag::Value {
            flag,
            separator: None,
        }
    }

    /// A flag whose value is split into list items on `separator`.
    pub const fn list(flag: &'static str, separator: char) -> Self {
        CliFlag::Value {
            flag,
            separator: Some(separator),
        }
    }

    pub const fn flag(&self) -> &'static str {
        match self {
            CliFlag::Switch { flag, .. } | CliFlag::Value { flag, .. } => *flag,
        }
    }

    pub const fn takes_value(&self) -> bool {
        matches!(self, CliFlag::Value { .. })
    }
}

/// Location of an option in the layered config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigKey {
    pub section: &'static str,
    pub key: &'static str,
}

/// Signature of a function that derives a default from already resolved options.
pub type DeriveFn = fn(&DefaultContext<'_>) -> Result<OptionValue, anyhow::Error>;

/// Default value of an option.
#[derive(Derivative, Clone, Copy)]
#[derivative(Debug)]
pub enum DefaultValue {
    Const(StaticValue),
    Derived {
        /// Options that must be resolved before this default can be computed.
        deps: &'static [&'static str],
        #[derivative(Debug = "ignore")]
        eval: DeriveFn,
    },
}

impl DefaultValue {
    pub const fn derived(deps: &'static [&'static str], eval: DeriveFn) -> Self {
        DefaultValue::Derived { deps, eval }
    }

    pub const fn deps(&self) -> &'static [&'static str] {
        match self {
            DefaultValue::Const(_) => &[],
            DefaultValue::Derived { deps, .. } => *deps,
        }
    }
}

/// Declaration of a single option.
#[derive(Debug, Clone, Copy)]
pub struct OptionDescriptor {
    name: &'static str,
    desc: &'static str,
    value_type: ValueType,
    default: DefaultValue,
    sources: Sources,
    /// Every target sharing a build environment must agree on this option.
    environment_critical: bool,
    command_line: &'static [CliFlag],
    config_key: Option<ConfigKey>,
    /// A command line value only applies when target rules left the option alone.
    cli_only_if_unset: bool,
}

impl OptionDescriptor {
    /// Declare a new option that may be set from every layer.
    pub const fn new(
        name: &'static str,
        desc: &'static str,
        value_type: ValueType,
        default: DefaultValue,
    ) -> Self {
        OptionDescriptor {
            name,
            desc,
            value_type,
            default,
            sources: Sources::all(),
            environment_critical: false,
            command_line: &[],
            config_key: None,
            cli_only_if_unset: false,
        }
    }

    pub const fn environment_critical(mut self) -> Self {
        self.environment_critical = true;
        self
    }

    pub const fn with_sources(mut self, sources: Sources) -> Self {
        self.sources = sources;
        self
    }

    pub const fn with_command_line(mut self, flags: &'static [CliFlag]) -> Self {
        self.command_line = flags;
        self
    }

    pub const fn with_config_key(mut self, section: &'static str, key: &'static str) -> Self {
        self.config_key = Some(ConfigKey { section, key });
        self
    }

    pub const fn cli_only_if_unset(mut self) -> Self {
        self.cli_only_if_unset = true;
        self
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn desc(&self) -> &'static str {
        self.desc
    }

    pub const fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub const fn default(&self) -> &DefaultValue {
        &self.default
    }

    pub const fn sources(&self) -> Sources {
        self.sources
    }

    pub const fn is_environment_critical(&self) -> bool {
        self.environment_critical
    }

    pub const fn command_line(&self) -> &'static [CliFlag] {
        self.command_line
    }

    pub const fn config_key(&self) -> Option<ConfigKey> {
        self.config_key
    }

    pub const fn is_cli_only_if_unset(&self) -> bool {
        self.cli_only_if_unset
    }

    /// Returns true if this option may be set from the command line.
    pub const fn allows_command_line(&self) -> bool {
        self.sources.contains(Sources::COMMAND_LINE) && !self.command_line.is_empty()
    }

    /// Returns true if this option may be read from config files.
    pub const fn allows_config_file(&self) -> bool {
        self.sources.contains(Sources::CONFIG_FILE) && self.config_key.is_some()
    }

    pub const fn allows_programmatic(&self) -> bool {
        self.sources.contains(Sources::PROGRAMMATIC)
    }
}

/// Typed handle to an [`OptionDescriptor`].
pub struct TargetOption<V> {
    descriptor: OptionDescriptor,
    _kind: PhantomData<fn() -> V>,
}

impl<V: OptionKind> TargetOption<V> {
    pub const fn new(descriptor: OptionDescriptor) -> Self {
        TargetOption {
            descriptor,
            _kind: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub const fn descriptor(&self) -> &OptionDescriptor {
        &self.descriptor
    }

    /// Read the value of this option from a set of resolved values.
    pub fn read_from(&self, resolved: &dyn ResolvedLookup) -> Result<V, SchemaError> {
        let value = resolved
            .lookup(self.name())
            .ok_or_else(|| SchemaError::UnknownOption {
                name: CompactString::const_new(self.name()),
            })?;
        V::from_value(value).ok_or_else(|| SchemaError::TypeMismatch {
            option: CompactString::const_new(self.name()),
            expected: self.descriptor.value_type,
            value: value.clone(),
        })
    }
}

/// Anything that can answer "what did option `name` resolve to?".
pub trait ResolvedLookup {
    fn lookup(&self, name: &str) -> Option<&OptionValue>;
}

impl ResolvedLookup for BTreeMap<&'static str, OptionValue> {
    fn lookup(&self, name: &str) -> Option<&OptionValue> {
        self.get(name)
    }
}

/// Everything a derived default is allowed to look at.
pub struct DefaultContext<'a> {
    option: &'static str,
    deps: &'static [&'static str],
    identity: &'a TargetIdentity,
    platform: &'a PlatformSupport,
    modules: &'a ModuleGraph,
    resolved: &'a dyn ResolvedLookup,
}

impl<'a> DefaultContext<'a> {
    pub fn new(
        descriptor: &OptionDescriptor,
        identity: &'a TargetIdentity,
        platform: &'a PlatformSupport,
        modules: &'a ModuleGraph,
        resolved: &'a dyn ResolvedLookup,
    ) -> Self {
        DefaultContext {
            option: descriptor.name,
            deps: descriptor.default.deps(),
            identity,
            platform,
            modules,
            resolved,
        }
    }

    pub fn identity(&self) -> &'a TargetIdentity {
        self.identity
    }

    pub fn platform(&self) -> &'a PlatformSupport {
        self.platform
    }

    pub fn modules(&self) -> &'a ModuleGraph {
        self.modules
    }

    /// Get the resolved value of a declared dependency.
    pub fn get(&self, name: &str) -> Result<&'a OptionValue, anyhow::Error> {
        if !self.deps.iter().any(|dep| *dep == name) {
            anyhow::bail!(
                "default of '{}' reads '{name}' without declaring it as a dependency",
                self.option
            );
        }
        self.resolved
            .lookup(name)
            .ok_or_else(|| anyhow::anyhow!("dependency '{name}' has not been resolved"))
    }

    /// Typed version of [`DefaultContext::get`].
    pub fn read<V: OptionKind>(&self, option: &TargetOption<V>) -> Result<V, anyhow::Error> {
        let value = self.get(option.name())?;
        V::from_value(value).ok_or_else(|| {
            anyhow::anyhow!("dependency '{}' holds unexpected value '{value}'", option.name())
        })
    }
}

/// Errors from declaring options, or from looking them up.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown option '{name}'")]
    UnknownOption { name: CompactString },
    #[error("option '{option}' has a default depending on unknown option '{dependency}'")]
    UnknownDependency {
        option: CompactString,
        dependency: CompactString,
    },
    #[error("circular default between options: {}", .cycle.join(" -> "))]
    CircularDefault { cycle: Vec<CompactString> },
    #[error("invalid value '{raw}', expected {expected}")]
    InvalidValue { expected: ValueType, raw: String },
    #[error("option '{option}' holds '{value}', expected {expected}")]
    TypeMismatch {
        option: CompactString,
        expected: ValueType,
        value: OptionValue,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tr_types::{Architecture, ArchitectureSet, Archetype, Configuration, PlatformId};

    static STATIC_CRT: TargetOption<bool> = TargetOption::new(
        OptionDescriptor::new(
            "use_static_crt",
            "Link against the static C runtime.",
            ValueType::Bool,
            DefaultValue::Const(StaticValue::Bool(false)),
        )
        .environment_critical()
        .with_command_line(&[CliFlag::switch("-StaticCRT", "true")]),
    );

    static LOGGING: TargetOption<bool> = TargetOption::new(
        OptionDescriptor::new(
            "use_logging",
            "Keep logging in release builds.",
            ValueType::Bool,
            DefaultValue::derived(&["use_static_crt"], |ctx| {
                let crt = ctx.read(&STATIC_CRT)?;
                Ok(OptionValue::Bool(!crt))
            }),
        )
        .with_sources(Sources::PROGRAMMATIC),
    );

    fn identity() -> TargetIdentity {
        TargetIdentity::new(
            "Shooter",
            Archetype::Game,
            PlatformId::new("Linux"),
            Configuration::Development,
            ArchitectureSet::single(Architecture::X86_64),
        )
    }

    fn platform() -> PlatformSupport {
        PlatformSupport {
            platform: PlatformId::new("Linux"),
            configurations: vec![Configuration::Development],
            architectures: ArchitectureSet::single(Architecture::X86_64),
            default_toolchain: CompactString::const_new("clang"),
        }
    }

    #[test]
    fn smoketest_descriptor() {
        let desc = STATIC_CRT.descriptor();
        assert_eq!(desc.name(), "use_static_crt");
        assert!(desc.is_environment_critical());
        assert!(desc.allows_command_line());
        assert!(!desc.allows_config_file());

        let desc = LOGGING.descriptor();
        assert!(desc.allows_programmatic());
        assert!(!desc.allows_command_line());
        assert_eq!(desc.default().deps(), &["use_static_crt"]);
    }

    #[test]
    fn smoketest_default_context() {
        let identity = identity();
        let platform = platform();
        let modules = ModuleGraph::default();
        let mut resolved: BTreeMap<&'static str, OptionValue> = BTreeMap::new();
        resolved.insert("use_static_crt", OptionValue::Bool(true));

        let ctx = DefaultContext::new(LOGGING.descriptor(), &identity, &platform, &modules, &resolved);
        let DefaultValue::Derived { eval, .. } = LOGGING.descriptor().default() else {
            panic!("expected a derived default");
        };
        assert_eq!(eval(&ctx).unwrap(), OptionValue::Bool(false));
    }

    #[test]
    fn undeclared_dependencies_are_rejected() {
        let identity = identity();
        let platform = platform();
        let modules = ModuleGraph::default();
        let mut resolved: BTreeMap<&'static str, OptionValue> = BTreeMap::new();
        resolved.insert("use_logging", OptionValue::Bool(true));

        let ctx =
            DefaultContext::new(STATIC_CRT.descriptor(), &identity, &platform, &modules, &resolved);
        let err = ctx.get("use_logging").unwrap_err();
        assert!(err.to_string().contains("without declaring it"));
    }

    #[test]
    fn read_from_reports_missing_and_mismatched() {
        let mut resolved: BTreeMap<&'static str, OptionValue> = BTreeMap::new();
        assert_eq!(
            STATIC_CRT.read_from(&resolved),
            Err(SchemaError::UnknownOption {
                name: CompactString::const_new("use_static_crt")
            })
        );

        resolved.insert("use_static_crt", OptionValue::Integer(1));
        assert!(matches!(
            STATIC_CRT.read_from(&resolved),
            Err(SchemaError::TypeMismatch { .. })
        ));

        resolved.insert("use_static_crt", OptionValue::Bool(true));
        assert_eq!(STATIC_CRT.read_from(&resolved), Ok(true));
    }
}
