//! Target rules: named constructors that programmatically configure a target.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use compact_str::CompactString;
use derivative::Derivative;
use tr_cfg::{OptionKind, OptionValue, Schema, SchemaError, TargetOption};
use tr_ore::assert_none;
use tr_types::{Configuration, TargetIdentity};

use crate::config_file::ConfigHierarchy;
use crate::options::{
    BuildEnvironment, LinkType, BUILD_ADDITIONAL_CONSOLE_APP, BUILD_DEVELOPER_TOOLS,
    BUILD_ENVIRONMENT, DISABLE_PLUGINS, ENABLE_PLUGINS, GLOBAL_DEFINITIONS, LINK_TYPE,
    USE_LOGGING_IN_SHIPPING, WITH_SERVER_CODE,
};

/// What target rules get to look at while configuring a target.
pub struct RulesContext<'a, 'c> {
    pub identity: &'a TargetIdentity,
    pub config: &'a ConfigHierarchy<'c>,
}

/// Constructor for a named set of target rules.
pub trait TargetRulesFactory: Send + Sync {
    fn configure(
        &self,
        ctx: &RulesContext<'_, '_>,
        overrides: &mut ProgrammaticOverrides,
    ) -> Result<(), anyhow::Error>;
}

impl<F> TargetRulesFactory for F
where
    F: Fn(&RulesContext<'_, '_>, &mut ProgrammaticOverrides) -> Result<(), anyhow::Error>
        + Send
        + Sync,
{
    fn configure(
        &self,
        ctx: &RulesContext<'_, '_>,
        overrides: &mut ProgrammaticOverrides,
    ) -> Result<(), anyhow::Error> {
        (self)(ctx, overrides)
    }
}

/// Values set programmatically, by target rules or a plan's per-target settings.
#[derive(Debug, Clone)]
pub struct ProgrammaticOverrides {
    schema: Schema,
    values: BTreeMap<&'static str, OptionValue>,
}

impl ProgrammaticOverrides {
    pub fn new(schema: Schema) -> Self {
        ProgrammaticOverrides {
            schema,
            values: BTreeMap::new(),
        }
    }

    /// Set `option` to `value`.
    pub fn set<V: OptionKind>(
        &mut self,
        option: &TargetOption<V>,
        value: V,
    ) -> Result<&mut Self, SchemaError> {
        let desc = self.schema.describe(option.name())?;
        self.values.insert(desc.name(), value.into_value());
        Ok(self)
    }

    /// Set the option named `name` from its textual representation.
    pub fn set_named(&mut self, name: &str, raw: &str) -> Result<&mut Self, SchemaError> {
        let desc = self.schema.describe(name)?;
        let value = desc.value_type().parse(raw)?;
        self.values.insert(desc.name(), value);
        Ok(self)
    }

    /// Append `item` to the list option `option`, starting from empty if it wasn't set yet.
    pub fn push(
        &mut self,
        option: &TargetOption<Vec<CompactString>>,
        item: impl Into<CompactString>,
    ) -> Result<&mut Self, SchemaError> {
        let desc = self.schema.describe(option.name())?;
        let entry = self
            .values
            .entry(desc.name())
            .or_insert_with(|| OptionValue::StringList(Vec::new()));
        match entry {
            OptionValue::StringList(items) => items.push(item.into()),
            other => {
                return Err(SchemaError::TypeMismatch {
                    option: CompactString::const_new(desc.name()),
                    expected: desc.value_type(),
                    value: other.clone(),
                });
            }
        }
        Ok(self)
    }

    /// Remove `item` from the list option `option` if it is present.
    pub fn remove(
        &mut self,
        option: &TargetOption<Vec<CompactString>>,
        item: &str,
    ) -> Result<&mut Self, SchemaError> {
        let desc = self.schema.describe(option.name())?;
        if let Some(OptionValue::StringList(items)) = self.values.get_mut(desc.name()) {
            items.retain(|existing| existing != item);
        }
        Ok(self)
    }

    /// Shorthand for adding a global preprocessor definition.
    pub fn add_definition(&mut self, definition: &str) -> Result<&mut Self, SchemaError> {
        self.push(&GLOBAL_DEFINITIONS, definition)
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &OptionValue)> {
        self.values.iter().map(|(name, value)| (*name, value))
    }
}

/// Target rules name to constructor.
#[derive(Derivative, Clone, Default)]
#[derivative(Debug)]
pub struct RulesRegistry {
    #[derivative(Debug(format_with = "rule_names"))]
    factories: BTreeMap<CompactString, Arc<dyn TargetRulesFactory>>,
}

fn rule_names(
    factories: &BTreeMap<CompactString, Arc<dyn TargetRulesFactory>>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    f.debug_set().entries(factories.keys()).finish()
}

impl RulesRegistry {
    /// Registry holding the rules that ship with `tr`.
    pub fn builtin() -> Self {
        let mut registry = RulesRegistry::default();
        registry
            .register("cooked-editor", CookedEditorRules::editor())
            .register("cooked-cooker", CookedEditorRules::cooker())
            .register("cooked-editor-external", CookedEditorRules::external());
        registry
    }

    /// Register a constructor.
    ///
    /// # Panics
    /// * If a constructor with the same name was already registered.
    pub fn register(
        &mut self,
        name: impl Into<CompactString>,
        factory: impl TargetRulesFactory + 'static,
    ) -> &mut Self {
        let name = name.into();
        let prev = self.factories.insert(name.clone(), Arc::new(factory));
        assert_none!(
            prev.map(|_| ()),
            "target rules '{name}' registered more than once"
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn TargetRulesFactory> {
        self.factories.get(name).map(|factory| &**factory)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(|name| name.as_str())
    }
}

/// Defaults for an editor that runs against cooked content.
#[derive(Debug, Clone, Copy)]
pub struct CookedEditorRules {
    /// The cooker keeps its console application.
    pub cooked_cooker: bool,
    /// Strip server code and developer tools for builds handed to external users.
    pub for_external_use: bool,
}

impl CookedEditorRules {
    const SETTINGS: &'static str = "CookedEditorSettings";

    pub const fn editor() -> Self {
        CookedEditorRules {
            cooked_cooker: false,
            for_external_use: false,
        }
    }

    pub const fn cooker() -> Self {
        CookedEditorRules {
            cooked_cooker: true,
            for_external_use: false,
        }
    }

    pub const fn external() -> Self {
        CookedEditorRules {
            cooked_cooker: false,
            for_external_use: true,
        }
    }

    /// Plugins the config asks us to disable for this flavor of cooked editor.
    fn disabled_plugins(&self, ctx: &RulesContext<'_, '_>) -> Vec<String> {
        let flavor = if self.cooked_cooker {
            "CookedEditorSettings_CookedCooker"
        } else {
            "CookedEditorSettings_CookedEditor"
        };
        let mut keys = vec![(Self::SETTINGS, "DisabledPlugins"), (flavor, "DisabledPlugins")];
        if ctx.identity.configuration() == Configuration::Shipping {
            keys.push((Self::SETTINGS, "DisabledPluginsInShipping"));
            keys.push((flavor, "DisabledPluginsInShipping"));
        }

        keys.into_iter()
            .filter_map(|(section, key)| ctx.config.get_array(section, key))
            .flatten()
            .cloned()
            .collect()
    }
}

impl TargetRulesFactory for CookedEditorRules {
    fn configure(
        &self,
        ctx: &RulesContext<'_, '_>,
        overrides: &mut ProgrammaticOverrides,
    ) -> Result<(), anyhow::Error> {
        overrides
            .set(&LINK_TYPE, LinkType::Monolithic)?
            .set(&BUILD_ENVIRONMENT, BuildEnvironment::Unique)?;

        if !self.cooked_cooker {
            overrides.set(&BUILD_ADDITIONAL_CONSOLE_APP, false)?;
        }

        overrides
            .add_definition("ASSETREGISTRY_ENABLE_PREMADE_REGISTRY_IN_EDITOR=1")?
            .set(&USE_LOGGING_IN_SHIPPING, true)?
            .add_definition("UE_IS_COOKED_EDITOR=1")?;

        if self.for_external_use {
            overrides
                .set(&WITH_SERVER_CODE, false)?
                .set(&BUILD_DEVELOPER_TOOLS, false)?
                .add_definition("AUTOSDKS_ENABLED=0")?;
        }

        overrides
            .add_definition("UE_ALLOW_SHADER_COMPILING_BASED_ON_SHADER_DIRECTORY_EXISTENCE=1")?;

        for plugin in self.disabled_plugins(ctx) {
            overrides
                .push(&DISABLE_PLUGINS, plugin.as_str())?
                .remove(&ENABLE_PLUGINS, &plugin)?;
        }

        tracing::debug!(
            target_name = ctx.identity.name(),
            cooked_cooker = self.cooked_cooker,
            external = self.for_external_use,
            "applied cooked editor defaults"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfgs::target_schema;
    use crate::config_file::ConfigFiles;
    use tr_types::{Architecture, ArchitectureSet, Archetype, PlatformId};

    fn identity(configuration: Configuration) -> TargetIdentity {
        TargetIdentity::new(
            "ShooterEditor",
            Archetype::Editor,
            PlatformId::new("Linux"),
            configuration,
            ArchitectureSet::single(Architecture::X86_64),
        )
        .with_rules("cooked-editor")
    }

    #[test]
    fn smoketest_overrides() {
        let mut overrides = ProgrammaticOverrides::new(target_schema().unwrap());
        overrides
            .set(&LINK_TYPE, LinkType::Modular)
            .unwrap()
            .set_named("use_static_crt", "yes")
            .unwrap();
        assert_eq!(
            overrides.get("link_type"),
            Some(&OptionValue::enum_variant("modular"))
        );
        assert_eq!(overrides.get("use_static_crt"), Some(&OptionValue::Bool(true)));

        let err = overrides.set_named("use_static_ctr", "true").unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownOption {
                name: "use_static_ctr".into()
            }
        );
        assert!(matches!(
            overrides.set_named("use_static_crt", "sometimes"),
            Err(SchemaError::InvalidValue { .. })
        ));
    }

    #[test]
    fn smoketest_cooked_editor() {
        let schema = target_schema().unwrap();
        let mut files = ConfigFiles::default();
        files
            .base_mut()
            .set_array("CookedEditorSettings", "DisabledPlugins", ["Bridge"])
            .set_array(
                "CookedEditorSettings_CookedEditor",
                "DisabledPluginsInShipping",
                ["Insights"],
            );
        let config = files.hierarchy(&PlatformId::new("Linux"));

        let identity = identity(Configuration::Shipping);
        let ctx = RulesContext {
            identity: &identity,
            config: &config,
        };
        let mut overrides = ProgrammaticOverrides::new(schema);
        overrides.push(&ENABLE_PLUGINS, "Bridge").unwrap();

        let registry = RulesRegistry::builtin();
        registry
            .get("cooked-editor")
            .unwrap()
            .configure(&ctx, &mut overrides)
            .unwrap();

        assert_eq!(
            overrides.get("link_type"),
            Some(&OptionValue::enum_variant("monolithic"))
        );
        assert_eq!(
            overrides.get("build_additional_console_app"),
            Some(&OptionValue::Bool(false))
        );
        let defines = overrides.get("global_definitions").unwrap().to_string();
        assert!(defines.contains("UE_IS_COOKED_EDITOR=1"));
        assert!(!defines.contains("AUTOSDKS_ENABLED=0"));

        let disabled = overrides.get("disable_plugins").unwrap().to_string();
        assert_eq!(disabled, "Bridge+Insights");
        assert_eq!(overrides.get("enable_plugins").unwrap().to_string(), "");
    }

    #[test]
    fn closures_are_factories() {
        fn static_crt(
            _: &RulesContext<'_, '_>,
            overrides: &mut ProgrammaticOverrides,
        ) -> Result<(), anyhow::Error> {
            overrides.set(&crate::options::USE_STATIC_CRT, true)?;
            Ok(())
        }

        let mut registry = RulesRegistry::default();
        registry.register("static-crt", static_crt);
        assert_eq!(registry.names().collect::<Vec<_>>(), ["static-crt"]);
        assert!(format!("{registry:?}").contains(r#"{"static-crt"}"#));
        assert!(registry.get("missing").is_none());
    }
}
