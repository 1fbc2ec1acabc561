//! Merges the layers of configuration for a single target.
//!
//! Every option starts from its default and is then overridden, in order, by the archetype
//! preset, config files, target rules and finally the command line.

use std::collections::BTreeMap;

use anyhow::Context;
use compact_str::CompactString;
use tr_cfg::{DefaultContext, DefaultValue, OptionDescriptor, OptionValue, Schema, ValueType};
use tr_types::{ModuleGraph, PlatformSupport, TargetIdentity};

use crate::args::CommandLine;
use crate::config_file::{ConfigFiles, ConfigHierarchy};
use crate::platform::PlatformRegistry;
use crate::policy::{self, Preset};
use crate::rules::{ProgrammaticOverrides, RulesContext, RulesRegistry};
use crate::snapshot::{ResolvedConfiguration, Snapshot, ValueSource};
use crate::{defines, Error};

/// A target to resolve along with its own overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRequest {
    pub identity: TargetIdentity,
    /// Arguments that only apply to this target.
    pub command_line: CommandLine,
    /// Programmatic overrides by option name, applied after target rules.
    pub settings: BTreeMap<CompactString, String>,
}

impl TargetRequest {
    pub fn new(identity: TargetIdentity) -> Self {
        TargetRequest {
            identity,
            command_line: CommandLine::default(),
            settings: BTreeMap::new(),
        }
    }

    pub fn with_command_line(mut self, command_line: CommandLine) -> Self {
        self.command_line = command_line;
        self
    }

    pub fn with_setting(mut self, name: impl Into<CompactString>, raw: impl Into<String>) -> Self {
        self.settings.insert(name.into(), raw.into());
        self
    }
}

/// Everything resolution reads, shared by every target.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    pub schema: &'a Schema,
    pub platforms: &'a PlatformRegistry,
    pub rules: &'a RulesRegistry,
    pub config: &'a ConfigFiles,
    pub modules: &'a ModuleGraph,
    /// Arguments for every target, a target's own arguments come after these.
    pub command_line: &'a CommandLine,
}

/// Layers for a single target.
struct Layers<'a, 'c> {
    identity: &'a TargetIdentity,
    platform: &'a PlatformSupport,
    preset: &'a Preset,
    config: &'a ConfigHierarchy<'c>,
    overrides: &'a ProgrammaticOverrides,
    command_line: &'a CommandLine,
}

impl Resolver<'_> {
    /// Resolve every option of the target described by `request`.
    pub fn resolve(&self, request: &TargetRequest) -> Result<Snapshot, Error> {
        let identity = &request.identity;
        let target = identity.name();
        tracing::debug!(%identity, "resolving target");

        let platform = self.check_supported(identity)?;
        let config = self.config.hierarchy(identity.platform());
        let command_line = self.command_line.merged(&request.command_line);
        let overrides = self.programmatic_overrides(request, &config)?;

        let preset = policy::base_preset(identity.archetype());
        if let Some(unknown) = preset
            .option_presets
            .keys()
            .find(|name| !self.schema.contains(name))
        {
            return Err(Error::UnknownOption {
                target: CompactString::new(target),
                option: CompactString::new(unknown),
            });
        }

        let layers = Layers {
            identity,
            platform,
            preset: &preset,
            config: &config,
            overrides: &overrides,
            command_line: &command_line,
        };

        let critical = self.schema.environment_critical().map(|desc| desc.name()).collect();
        let mut resolved = ResolvedConfiguration::new(identity.clone(), critical);
        for desc in self.schema.resolution_order() {
            let (value, source) =
                self.resolve_option(desc, &layers, &resolved)
                    .map_err(|source| Error::Resolution {
                        target: CompactString::new(target),
                        option: CompactString::const_new(desc.name()),
                        source,
                    })?;
            tracing::trace!(target_name = target, option = desc.name(), %value, %source, "resolved");
            resolved.insert(desc.name(), value, source);
        }

        defines::finish(&mut resolved, &preset);
        Ok(Snapshot::new(resolved))
    }

    fn check_supported(&self, identity: &TargetIdentity) -> Result<&PlatformSupport, Error> {
        let unsupported = |reason: String| Error::UnsupportedTarget {
            target: CompactString::new(identity.name()),
            reason,
        };

        let platform = self
            .platforms
            .get(identity.platform())
            .ok_or_else(|| unsupported(format!("unknown platform '{}'", identity.platform())))?;
        if !platform.supports_configuration(identity.configuration()) {
            return Err(unsupported(format!(
                "platform '{}' does not support configuration '{}'",
                identity.platform(),
                identity.configuration()
            )));
        }
        if identity.architectures().is_empty() {
            return Err(unsupported("no architectures requested".to_string()));
        }
        if !platform.supports_architectures(identity.architectures()) {
            return Err(unsupported(format!(
                "platform '{}' does not support architectures '{}'",
                identity.platform(),
                identity.architectures()
            )));
        }
        Ok(platform)
    }

    /// Run the target rules, then apply the request's own settings.
    fn programmatic_overrides(
        &self,
        request: &TargetRequest,
        config: &ConfigHierarchy<'_>,
    ) -> Result<ProgrammaticOverrides, Error> {
        let identity = &request.identity;
        let target = identity.name();
        let mut overrides = ProgrammaticOverrides::new(self.schema.clone());

        if let Some(rules) = identity.rules() {
            let factory = self.rules.get(rules).ok_or_else(|| Error::MissingConstructor {
                target: CompactString::new(target),
                rules: CompactString::new(rules),
            })?;
            let ctx = RulesContext { identity, config };
            factory
                .configure(&ctx, &mut overrides)
                .map_err(|source| Error::ConstructorFailed {
                    target: CompactString::new(target),
                    rules: CompactString::new(rules),
                    source,
                })?;
        }

        for (name, raw) in &request.settings {
            overrides
                .set_named(name, raw)
                .map_err(|err| Error::from_schema(target, name, err))?;
        }

        for (name, _) in overrides.iter() {
            let desc = self
                .schema
                .describe(name)
                .map_err(|err| Error::from_schema(target, name, err))?;
            if !desc.allows_programmatic() {
                return Err(Error::Resolution {
                    target: CompactString::new(target),
                    option: CompactString::const_new(name),
                    source: anyhow::anyhow!("option can not be set by target rules"),
                });
            }
        }

        Ok(overrides)
    }

    fn resolve_option(
        &self,
        desc: &'static OptionDescriptor,
        layers: &Layers<'_, '_>,
        resolved: &ResolvedConfiguration,
    ) -> Result<(OptionValue, ValueSource), anyhow::Error> {
        let value_type = desc.value_type();

        let (mut value, mut source) = match desc.default() {
            DefaultValue::Const(val) => (val.to_value(), ValueSource::Default),
            DefaultValue::Derived { eval, .. } => {
                let ctx = DefaultContext::new(
                    desc,
                    layers.identity,
                    layers.platform,
                    self.modules,
                    resolved,
                );
                let value = eval(&ctx).context("computing default")?;
                (value, ValueSource::Derived)
            }
        };
        if !value_type.accepts(&value) {
            anyhow::bail!("default '{value}' is not a valid {value_type}");
        }

        if let Some(preset) = layers.preset.option_presets.get(desc.name()) {
            value = preset.clone();
            source = ValueSource::Policy;
        }

        if let Some(key) = desc.config_key().filter(|_| desc.allows_config_file()) {
            if let Some(items) = layers.config.get_array(key.section, key.key) {
                value = value_type
                    .parse_items(items)
                    .with_context(|| format!("config value [{}] {}", key.section, key.key))?;
                source = ValueSource::ConfigFile;
            }
        }

        let programmatic = layers.overrides.get(desc.name());
        if let Some(programmatic) = programmatic {
            if !value_type.accepts(programmatic) {
                anyhow::bail!("target rules set '{programmatic}', expected {value_type}");
            }
            value = programmatic.clone();
            source = ValueSource::Programmatic;
        }

        if desc.allows_command_line() {
            let raw: Vec<&str> = layers.command_line.matches(desc.command_line()).collect();
            if let Some(last) = raw.last() {
                if desc.is_cli_only_if_unset() && programmatic.is_some() {
                    tracing::debug!(
                        option = desc.name(),
                        "target rules already set option, ignoring command line"
                    );
                } else {
                    value = match (value_type, value) {
                        // Command line items add to what the lower layers set.
                        (ValueType::StringList, OptionValue::StringList(mut items)) => {
                            let added = raw
                                .iter()
                                .map(|item| item.trim())
                                .filter(|item| !item.is_empty());
                            items.extend(added.map(CompactString::new));
                            OptionValue::StringList(items)
                        }
                        _ => value_type.parse(last).context("command line value")?,
                    };
                    source = ValueSource::CommandLine;
                }
            }
        }

        Ok((value, source))
    }
}
