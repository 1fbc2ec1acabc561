//! Preprocessor definitions and upgrade notes computed once every option is resolved.

use std::collections::BTreeSet;

use compact_str::{format_compact, CompactString};
use tr_cfg::{OptionKind, TargetOption};
use tr_types::{Archetype, Configuration};

use crate::options::*;
use crate::policy::Preset;
use crate::snapshot::{ResolvedConfiguration, ValueSource};

/// Fill in the definitions and diagnostics of `resolved`.
pub(crate) fn finish(resolved: &mut ResolvedConfiguration, preset: &Preset) {
    let mut definitions = Vec::new();
    let mut seen = BTreeSet::new();
    let mut add = |definition: CompactString| {
        if seen.insert(definition.clone()) {
            definitions.push(definition);
        }
    };

    for definition in &preset.definitions {
        add(definition.clone());
    }
    for definition in derived(resolved) {
        add(definition);
    }
    for definition in read(resolved, &GLOBAL_DEFINITIONS).unwrap_or_default() {
        add(definition);
    }

    let project_definitions = read(resolved, &PROJECT_DEFINITIONS).unwrap_or_default();
    resolved.set_definitions(definitions, project_definitions);

    for message in upgrade_notes(resolved) {
        tracing::debug!(target_name = resolved.identity().name(), "{message}");
        resolved.push_diagnostic(message);
    }
}

fn read<V: OptionKind>(resolved: &ResolvedConfiguration, option: &TargetOption<V>) -> Option<V> {
    option.read_from(resolved).ok()
}

fn flag(name: &str, enabled: bool) -> CompactString {
    format_compact!("{name}={}", u8::from(enabled))
}

fn derived(resolved: &ResolvedConfiguration) -> Vec<CompactString> {
    let identity = resolved.identity();
    let mut defines = Vec::new();

    let toggles: [(&str, &TargetOption<bool>); 10] = [
        ("WITH_ENGINE", &COMPILE_AGAINST_ENGINE),
        ("WITH_COREUOBJECT", &COMPILE_AGAINST_CORE_UOBJECT),
        ("WITH_EDITOR", &COMPILE_AGAINST_EDITOR),
        ("WITH_EDITORONLY_DATA", &BUILD_WITH_EDITOR_ONLY_DATA),
        ("WITH_SERVER_CODE", &WITH_SERVER_CODE),
        ("WITH_PUSH_MODEL", &WITH_PUSH_MODEL),
        ("WITH_PERFCOUNTERS", &WITH_PERF_COUNTERS),
        ("WITH_LIVE_CODING", &WITH_LIVE_CODING),
        ("WITH_DEV_AUTOMATION_TESTS", &WITH_AUTOMATION_TESTS),
        ("WITH_LOW_LEVEL_TESTS", &WITH_LOW_LEVEL_TESTS),
    ];
    for (name, option) in toggles {
        if let Some(enabled) = read(resolved, option) {
            defines.push(flag(name, enabled));
        }
    }

    if let Some(link_type) = read(resolved, &LINK_TYPE) {
        defines.push(flag("IS_MONOLITHIC", link_type == LinkType::Monolithic));
    }
    defines.push(flag("IS_PROGRAM", identity.archetype() == Archetype::Program));
    defines.push(format_compact!("UBT_COMPILED_PLATFORM={}", identity.platform()));

    let build = match identity.configuration() {
        Configuration::Debug | Configuration::DebugGame => "UE_BUILD_DEBUG",
        Configuration::Development => "UE_BUILD_DEVELOPMENT",
        Configuration::Shipping => "UE_BUILD_SHIPPING",
        Configuration::Test => "UE_BUILD_TEST",
    };
    defines.push(flag(build, true));

    if let Some(order) = read(resolved, &INCLUDE_ORDER_VERSION) {
        for version in IncludeOrderVersion::DEPRECATIONS {
            let name = format_compact!(
                "UE_ENABLE_INCLUDE_ORDER_DEPRECATED_IN_{}",
                version.define_suffix()
            );
            defines.push(flag(&name, order < *version));
        }
    }

    if let Some(custom) = read(resolved, &CUSTOM_CONFIG).filter(|custom| !custom.is_empty()) {
        defines.push(format_compact!("UE_CUSTOM_CONFIG={custom}"));
    }

    defines
}

/// Notes for targets that opted into older defaults.
fn upgrade_notes(resolved: &ResolvedConfiguration) -> Vec<String> {
    let mut notes = Vec::new();

    if let Some(version) = read(resolved, &BUILD_SETTINGS_VERSION) {
        if version < BuildSettingsVersion::LATEST {
            let mut changed: Vec<(&str, &str)> = Vec::new();
            if version < BuildSettingsVersion::V2 {
                changed.push((
                    "legacy_public_include_paths = false",
                    "omits public sub folders from include paths",
                ));
                changed.push((
                    "shadow_variable_errors = true",
                    "treats shadowed variables as errors",
                ));
            }
            if version < BuildSettingsVersion::V3 {
                changed.push((
                    "legacy_parent_include_paths = false",
                    "omits module parent folders from include paths",
                ));
            }
            if version < BuildSettingsVersion::V4 {
                changed.push(("cpp_standard = cpp20", "compiles as C++20, previously C++17"));
                changed.push((
                    "strict_conformance_mode = true",
                    "asks for strict standard conformance",
                ));
            }

            notes.push(
                "[Upgrade] Using backward-compatible build settings, the latest defaults change:"
                    .to_string(),
            );
            let width = changed.iter().map(|(setting, _)| setting.len()).max().unwrap_or(0);
            for (setting, why) in changed {
                notes.push(format!("[Upgrade]     {setting:<width$}   => {why}"));
            }
            notes.push(format!(
                "[Upgrade] Suppress this message by setting 'build_settings_version = {}'.",
                BuildSettingsVersion::LATEST
            ));
        }
    }

    let forced = resolved
        .get(INCLUDE_ORDER_VERSION.name())
        .is_some_and(|value| value.source == ValueSource::CommandLine);
    if let Some(order) = read(resolved, &INCLUDE_ORDER_VERSION) {
        if order < IncludeOrderVersion::LATEST && !forced {
            notes.push(format!(
                "[Upgrade] Using backward-compatible include order 'include_order_version = {order}'."
            ));
            notes.push(format!(
                "[Upgrade] Suppress this message by setting 'include_order_version = {}'.",
                IncludeOrderVersion::LATEST
            ));
        }
    }

    notes
}
