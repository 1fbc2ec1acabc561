//! Turns resolved targets into text for other tools.
//!
//! Emitters only ever return strings, writing them somewhere is up to the caller.

use crate::snapshot::Snapshot;

mod definitions;
mod makefile;
mod variables;

pub use definitions::DefinitionsEmitter;
pub use makefile::MakefileEmitter;
pub use variables::VariablesEmitter;

/// Renders a set of resolved targets as text.
pub trait Emitter {
    fn emit(&self, snapshots: &[Snapshot]) -> Result<String, anyhow::Error>;
}

#[cfg(test)]
pub(crate) mod testing {
    use tr_cfg::OptionValue;
    use tr_types::{
        Architecture, ArchitectureSet, Archetype, Configuration, PlatformId, TargetIdentity,
    };

    use crate::snapshot::{ResolvedConfiguration, Snapshot, ValueSource};

    /// Hand built snapshot with two options and a couple of definitions.
    pub fn snapshot(name: &str, configuration: Configuration) -> Snapshot {
        let identity = TargetIdentity::new(
            name,
            Archetype::Game,
            PlatformId::new("Linux"),
            configuration,
            ArchitectureSet::single(Architecture::X86_64),
        );
        let mut resolved = ResolvedConfiguration::new(identity, vec!["use_static_crt"]);
        resolved.insert(
            "link_type",
            OptionValue::enum_variant("monolithic"),
            ValueSource::Policy,
        );
        resolved.insert("use_static_crt", OptionValue::Bool(false), ValueSource::Default);
        resolved.set_definitions(
            vec!["UE_GAME=1".into(), "WITH_EDITOR=0".into(), "UE_NO_VALUE".into()],
            vec!["MY_PROJECT=1".into()],
        );
        Snapshot::new(resolved)
    }
}
