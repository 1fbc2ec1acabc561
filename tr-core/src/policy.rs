//! Baseline definitions and option presets per target archetype.

use std::collections::{BTreeMap, BTreeSet};

use compact_str::CompactString;
use tr_cfg::{OptionKind, OptionValue};
use tr_types::Archetype;

use crate::options::{LinkType, LINK_TYPE, WITH_SERVER_CODE};

/// What an archetype starts out with before config, target rules, or the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preset {
    pub definitions: BTreeSet<CompactString>,
    pub option_presets: BTreeMap<&'static str, OptionValue>,
}

impl Preset {
    fn define(mut self, definition: &str) -> Self {
        self.definitions.insert(CompactString::new(definition));
        self
    }

    fn preset(mut self, option: &'static str, value: OptionValue) -> Self {
        self.option_presets.insert(option, value);
        self
    }
}

/// Returns the baseline for `archetype`.
///
/// Programs and tests have no baseline and get an empty [`Preset`].
pub fn base_preset(archetype: Archetype) -> Preset {
    let preset = Preset::default();
    match archetype {
        Archetype::Game => preset
            .define("UE_GAME=1")
            .preset(LINK_TYPE.name(), LinkType::Monolithic.into_value()),
        Archetype::Client => preset
            .define("UE_GAME=1")
            .define("UE_CLIENT=1")
            .preset(LINK_TYPE.name(), LinkType::Monolithic.into_value())
            .preset(WITH_SERVER_CODE.name(), false.into_value()),
        Archetype::Editor => preset
            .define("UE_EDITOR=1")
            .preset(LINK_TYPE.name(), LinkType::Modular.into_value()),
        Archetype::Server => preset
            .define("UE_SERVER=1")
            .define("USE_NULL_RHI=1")
            .preset(LINK_TYPE.name(), LinkType::Monolithic.into_value()),
        Archetype::Program | Archetype::Test => preset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoketest_presets() {
        let editor = base_preset(Archetype::Editor);
        assert!(editor.definitions.contains("UE_EDITOR=1"));
        assert_eq!(
            editor.option_presets.get("link_type"),
            Some(&OptionValue::enum_variant("modular"))
        );

        let server = base_preset(Archetype::Server);
        let defines: Vec<_> = server.definitions.iter().map(|d| d.as_str()).collect();
        assert_eq!(defines, ["UE_SERVER=1", "USE_NULL_RHI=1"]);

        let client = base_preset(Archetype::Client);
        assert_eq!(
            client.option_presets.get("with_server_code"),
            Some(&OptionValue::Bool(false))
        );
    }

    #[test]
    fn programs_and_tests_are_empty() {
        assert_eq!(base_preset(Archetype::Program), Preset::default());
        assert_eq!(base_preset(Archetype::Test), Preset::default());
    }

    #[test]
    fn presets_are_pure() {
        assert_eq!(base_preset(Archetype::Game), base_preset(Archetype::Game));
    }
}
