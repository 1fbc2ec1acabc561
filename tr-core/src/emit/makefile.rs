use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::PathBuf;

use tr_types::Configuration;

use super::Emitter;
use crate::snapshot::Snapshot;

/// A Makefile with one rule per resolved target.
///
/// Development targets get a rule with their bare name, every other configuration is spelled
/// `<name>-<platform>-<configuration>`.
#[derive(Debug, Clone)]
pub struct MakefileEmitter {
    /// Root of the engine checkout, becomes `UNREALROOTPATH`.
    pub root: PathBuf,
    /// Script invoked by every rule, relative to the root.
    pub build_script: PathBuf,
}

impl Default for MakefileEmitter {
    fn default() -> Self {
        MakefileEmitter {
            root: PathBuf::from("."),
            build_script: PathBuf::from("Engine/Build/BatchFiles/Linux/Build.sh"),
        }
    }
}

struct Rule<'a> {
    name: String,
    target: &'a str,
    platform: &'a str,
    configuration: &'static str,
    project: bool,
}

impl Emitter for MakefileEmitter {
    fn emit(&self, snapshots: &[Snapshot]) -> Result<String, anyhow::Error> {
        let mut project_file = None;
        let mut rules = BTreeMap::new();

        for snapshot in snapshots {
            let identity = snapshot.identity();
            let configuration = make_name(identity.configuration());
            let name = if identity.configuration() == Configuration::Development {
                identity.name().to_string()
            } else {
                format!("{}-{}-{configuration}", identity.name(), identity.platform())
            };

            if let Some(project) = identity.project() {
                match &project_file {
                    None => project_file = Some(project),
                    Some(existing) if *existing != project => anyhow::bail!(
                        "targets reference more than one project, '{}' and '{}'",
                        existing.display(),
                        project.display()
                    ),
                    Some(_) => (),
                }
            }

            let rule = Rule {
                name: name.clone(),
                target: identity.name(),
                platform: identity.platform().as_str(),
                configuration,
                project: identity.project().is_some(),
            };
            if rules.insert(name.clone(), rule).is_some() {
                anyhow::bail!("more than one target produces the rule '{name}'");
            }
        }

        let mut out = String::new();
        writeln!(out, "# Makefile generated by trc")?;
        writeln!(out, "# *DO NOT EDIT*")?;
        writeln!(out)?;
        writeln!(out, "UNREALROOTPATH = {}", self.root.display())?;
        if let Some(project) = project_file {
            writeln!(out, "GAMEPROJECTFILE = {}", project.display())?;
        }
        writeln!(out)?;

        write!(out, "TARGETS =")?;
        for name in rules.keys() {
            write!(out, " \\\n\t{name}")?;
        }
        writeln!(out)?;
        writeln!(out)?;

        writeln!(
            out,
            "BUILD = bash \"$(UNREALROOTPATH)/{}\"",
            self.build_script.display()
        )?;

        for rule in rules.values() {
            let project_arg = if rule.project {
                " -project=\"$(GAMEPROJECTFILE)\""
            } else {
                ""
            };
            write!(
                out,
                "\n{}:\n\t $(BUILD) {} {} {}{project_arg} $(ARGS)\n",
                rule.name, rule.target, rule.platform, rule.configuration
            )?;
        }

        writeln!(out, "\n.PHONY: $(TARGETS)")?;
        Ok(out)
    }
}

/// Spelling of a configuration that the build script expects.
fn make_name(configuration: Configuration) -> &'static str {
    match configuration {
        Configuration::Debug => "Debug",
        Configuration::DebugGame => "DebugGame",
        Configuration::Development => "Development",
        Configuration::Shipping => "Shipping",
        Configuration::Test => "Test",
    }
}
