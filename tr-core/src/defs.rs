//! Build plans, a TOML description of the targets to resolve and everything they read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use compact_str::CompactString;
use serde::Deserialize;
use tr_types::{
    Architecture, ArchitectureSet, Archetype, Configuration, ModuleGraph, ModuleInfo, PlatformId,
    PlatformSupport, TargetIdentity,
};

use crate::args::CommandLine;
use crate::config_file::{ConfigFile, ConfigFiles};
use crate::platform::PlatformRegistry;
use crate::resolver::TargetRequest;

/// Definition of a build plan.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanSpec {
    /// Platforms targets can be built for, the desktop platforms if empty.
    #[serde(default)]
    pub platforms: BTreeMap<String, PlatformSpec>,
    #[serde(default)]
    pub config: ConfigSpec,
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleSpec>,
    /// Command line arguments for every target.
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub targets: Vec<TargetSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformSpec {
    pub configurations: Vec<String>,
    pub architectures: Vec<String>,
    pub toolchain: String,
}

/// Section name to key to value.
pub type SectionsSpec = BTreeMap<String, BTreeMap<String, ConfigValueSpec>>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSpec {
    #[serde(default)]
    pub base: SectionsSpec,
    /// Per-platform layers, these win over `base`.
    #[serde(default)]
    pub platform: BTreeMap<String, SectionsSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConfigValueSpec {
    Value(String),
    Bool(bool),
    Integer(i64),
    Array(Vec<String>),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleSpec {
    #[serde(default)]
    pub public: Vec<String>,
    #[serde(default)]
    pub private: Vec<String>,
    #[serde(default)]
    pub shared_pch: bool,
    #[serde(default)]
    pub hot_reload: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSpec {
    pub name: String,
    pub archetype: String,
    pub platform: String,
    pub configuration: String,
    /// Defaults to the first architecture of the platform.
    #[serde(default)]
    pub architectures: Vec<String>,
    pub project: Option<PathBuf>,
    pub rules: Option<String>,
    /// Command line arguments for just this target.
    #[serde(default)]
    pub args: Vec<String>,
    /// Option name to raw value, applied like target rules.
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

impl PlanSpec {
    pub fn from_toml(raw: &str) -> Result<Self, anyhow::Error> {
        let plan = toml::from_str(raw)?;
        Ok(plan)
    }

    pub fn from_path(path: &Path) -> Result<Self, anyhow::Error> {
        tracing::info!(?path, "reading build plan");
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading plan '{}'", path.display()))?;
        PlanSpec::from_toml(&raw).with_context(|| format!("parsing plan '{}'", path.display()))
    }

    pub fn platforms(&self) -> Result<PlatformRegistry, anyhow::Error> {
        if self.platforms.is_empty() {
            return Ok(PlatformRegistry::desktop());
        }

        let mut registry = PlatformRegistry::default();
        for (name, spec) in &self.platforms {
            let configurations = spec
                .configurations
                .iter()
                .map(|raw| Configuration::from_str(raw))
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("platform '{name}'"))?;
            let architectures =
                parse_architectures(&spec.architectures).with_context(|| format!("platform '{name}'"))?;

            registry.register(PlatformSupport {
                platform: PlatformId::new(name.as_str()),
                configurations,
                architectures,
                default_toolchain: CompactString::new(&spec.toolchain),
            });
        }
        Ok(registry)
    }

    pub fn config_files(&self) -> ConfigFiles {
        let mut files = ConfigFiles::default();
        fill_config(files.base_mut(), &self.config.base);
        for (platform, sections) in &self.config.platform {
            fill_config(files.platform_mut(PlatformId::new(platform.as_str())), sections);
        }
        files
    }

    pub fn modules(&self) -> ModuleGraph {
        let mut graph = ModuleGraph::default();
        for (name, spec) in &self.modules {
            let info = ModuleInfo {
                public_dependencies: spec.public.iter().map(CompactString::new).collect(),
                private_dependencies: spec.private.iter().map(CompactString::new).collect(),
                wants_shared_pch: spec.shared_pch,
                can_hot_reload: spec.hot_reload,
            };
            graph.insert(name.as_str(), info);
        }
        graph
    }

    pub fn command_line(&self) -> CommandLine {
        CommandLine::parse(&self.args)
    }

    /// Requests for every target, architectures left empty default from `platforms`.
    pub fn requests(&self, platforms: &PlatformRegistry) -> Result<Vec<TargetRequest>, anyhow::Error> {
        self.targets
            .iter()
            .map(|spec| {
                spec.to_request(platforms)
                    .with_context(|| format!("target '{}'", spec.name))
            })
            .collect()
    }
}

impl TargetSpec {
    fn to_request(&self, platforms: &PlatformRegistry) -> Result<TargetRequest, anyhow::Error> {
        let archetype = Archetype::from_str(&self.archetype)?;
        let configuration = Configuration::from_str(&self.configuration)?;
        let platform = PlatformId::new(self.platform.as_str());

        let architectures = if self.architectures.is_empty() {
            // Unknown platforms are reported during resolution.
            let default = platforms
                .get(&platform)
                .and_then(|support| support.default_architecture());
            ArchitectureSet::new(default.cloned())
        } else {
            parse_architectures(&self.architectures)?
        };

        let mut identity =
            TargetIdentity::new(self.name.as_str(), archetype, platform, configuration, architectures);
        if let Some(project) = &self.project {
            identity = identity.with_project(project.clone());
        }
        if let Some(rules) = &self.rules {
            identity = identity.with_rules(rules.as_str());
        }

        let mut request = TargetRequest::new(identity).with_command_line(CommandLine::parse(&self.args));
        for (name, raw) in &self.settings {
            request = request.with_setting(name.as_str(), raw.as_str());
        }
        Ok(request)
    }
}

fn parse_architectures(raw: &[String]) -> Result<ArchitectureSet, anyhow::Error> {
    let archs = raw
        .iter()
        .map(|name| {
            Architecture::from_str(name)
                .map_err(|()| anyhow::anyhow!("unknown architecture '{name}'"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ArchitectureSet::new(archs))
}

fn fill_config(file: &mut ConfigFile, sections: &SectionsSpec) {
    for (section, keys) in sections {
        for (key, value) in keys {
            match value {
                ConfigValueSpec::Value(value) => file.set_value(section, key, value.as_str()),
                ConfigValueSpec::Bool(value) => file.set_value(section, key, value.to_string()),
                ConfigValueSpec::Integer(value) => file.set_value(section, key, value.to_string()),
                ConfigValueSpec::Array(values) => file.set_array(section, key, values.iter().cloned()),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    static PLAN: &str = r#"
args = ["-StaticCRT"]

[platforms.Linux]
configurations = ["debug", "development", "shipping"]
architectures = ["x86_64", "aarch64"]
toolchain = "clang"

[config.base."/Script/BuildSettings.BuildSettings"]
bUseStaticCRT = false
[config.platform.Linux.BuildConfiguration]
DisabledPlugins = ["Bridge", "Insights"]
OptimizationLevel = "size"

[modules.Core]
shared_pch = true
[modules.Engine]
public = ["Core"]

[[targets]]
name = "MyGameEditor"
archetype = "editor"
platform = "Linux"
configuration = "development"
architectures = ["x86_64"]
rules = "cooked-editor"
args = ["-UseIris"]
[targets.settings]
use_static_crt = "true"

[[targets]]
name = "MyGame"
archetype = "game"
platform = "Linux"
configuration = "shipping"
project = "MyGame.uproject"
"#;

    #[test]
    fn smoketest_plan() {
        let plan = PlanSpec::from_toml(PLAN).unwrap();

        let platforms = plan.platforms().unwrap();
        let linux = platforms.get(&PlatformId::new("Linux")).unwrap();
        assert!(linux.supports_configuration(Configuration::Shipping));
        assert!(!linux.supports_configuration(Configuration::Test));
        assert_eq!(linux.default_toolchain, "clang");

        let config = plan.config_files();
        let linux_config = config.hierarchy(&PlatformId::new("Linux"));
        assert_eq!(
            linux_config.get_value("/Script/BuildSettings.BuildSettings", "bUseStaticCRT"),
            Some("false")
        );
        assert_eq!(
            linux_config.get_array("BuildConfiguration", "DisabledPlugins"),
            Some(&["Bridge".to_string(), "Insights".to_string()][..])
        );
        let win_config = config.hierarchy(&PlatformId::new("Win64"));
        assert_eq!(win_config.get_value("BuildConfiguration", "OptimizationLevel"), None);

        let modules = plan.modules();
        assert_eq!(modules.len(), 2);
        assert!(modules.any_wants_shared_pch());
        assert!(!modules.any_can_hot_reload());

        assert!(plan.command_line().has_switch("-StaticCRT"));

        let requests = plan.requests(&platforms).unwrap();
        assert_eq!(requests.len(), 2);

        let editor = &requests[0];
        assert_eq!(editor.identity.archetype(), Archetype::Editor);
        assert_eq!(editor.identity.rules(), Some("cooked-editor"));
        assert!(editor.command_line.has_switch("-UseIris"));
        assert_eq!(editor.settings.get("use_static_crt").map(String::as_str), Some("true"));

        // No architectures, falls back to the platform's first.
        let game = &requests[1];
        let aarch64 = Architecture::Aarch64(target_lexicon::Aarch64Architecture::Aarch64);
        assert_eq!(game.identity.architectures(), &ArchitectureSet::single(aarch64));
        assert_eq!(game.identity.project(), Some(Path::new("MyGame.uproject")));
    }

    #[test]
    fn empty_plan_uses_desktop_platforms() {
        let plan = PlanSpec::from_toml("").unwrap();
        let platforms = plan.platforms().unwrap();
        assert!(platforms.get(&PlatformId::new("Win64")).is_some());
        assert!(plan.requests(&platforms).unwrap().is_empty());
    }

    #[test]
    fn invalid_plans() {
        let err = PlanSpec::from_toml("[[targets]]\nname = \"A\"\n").unwrap_err();
        assert!(err.to_string().contains("archetype"), "{err}");

        let plan = PlanSpec::from_toml(
            r#"
[[targets]]
name = "A"
archetype = "gadget"
platform = "Linux"
configuration = "development"
"#,
        )
        .unwrap();
        let err = plan.requests(&PlatformRegistry::desktop()).unwrap_err();
        assert_eq!(format!("{err:#}"), "target 'A': unknown archetype 'gadget'");

        assert!(PlanSpec::from_toml("unknown_key = 1").is_err());
    }

    #[test]
    fn plan_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PLAN.as_bytes()).unwrap();

        let plan = PlanSpec::from_path(file.path()).unwrap();
        assert_eq!(plan.targets.len(), 2);

        let missing = file.path().with_extension("missing");
        let err = PlanSpec::from_path(&missing).unwrap_err();
        assert!(err.to_string().starts_with("reading plan"));
    }

    #[test]
    fn config_values_keep_their_shape() {
        let plan = PlanSpec::from_toml(
            r#"
[config.base.S]
flag = true
level = 3
list = ["a", "b"]
"#,
        )
        .unwrap();
        let files = plan.config_files();
        let base = files.hierarchy(&PlatformId::new("Any"));
        assert_eq!(base.get_value("S", "flag"), Some("true"));
        assert_eq!(base.get_value("S", "level"), Some("3"));
        assert_eq!(base.get_value("S", "list"), None);
        assert_eq!(base.get_array("S", "list").map(<[String]>::len), Some(2));
    }
}
