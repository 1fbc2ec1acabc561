//! Single interface for registering all of the [`TargetOption`]s a target can be configured with.
//!
//! [`TargetOption`]: tr_cfg::TargetOption

use tr_cfg::{Schema, SchemaBuilder, SchemaError};

use crate::options::*;

pub fn all_options(builder: &mut SchemaBuilder) {
    builder
        .register(&LINK_TYPE)
        .register(&BUILD_ENVIRONMENT)
        .register(&OVERRIDE_BUILD_ENVIRONMENT)
        .register(&BUILD_SETTINGS_VERSION)
        .register(&INCLUDE_ORDER_VERSION)
        .register(&USE_STATIC_CRT)
        .register(&DEBUG_BUILDS_USE_DEBUG_CRT)
        .register(&UNDECORATED_CONFIGURATION)
        .register(&COMPILE_AS_DLL)
        .register(&CUSTOM_CONFIG)
        .register(&EXE_BINARIES_SUB_FOLDER)
        .register(&OUTPUT_FILE)
        .register(&TARGET_NAME_OVERRIDE)
        .register(&USE_LOGGING_IN_SHIPPING)
        .register(&BUILD_ADDITIONAL_CONSOLE_APP)
        .register(&USE_VERSE)
        .register(&USE_IRIS)
        .register(&COMPILE_AGAINST_ENGINE)
        .register(&COMPILE_AGAINST_CORE_UOBJECT)
        .register(&COMPILE_AGAINST_EDITOR)
        .register(&BUILD_REQUIRES_COOKED_DATA)
        .register(&BUILD_WITH_EDITOR_ONLY_DATA)
        .register(&BUILD_DEVELOPER_TOOLS)
        .register(&WITH_SERVER_CODE)
        .register(&WITH_PUSH_MODEL)
        .register(&WITH_PERF_COUNTERS)
        .register(&WITH_LIVE_CODING)
        .register(&ALLOW_HOT_RELOAD)
        .register(&USE_SHARED_PCHS)
        .register(&USE_UNITY_BUILD)
        .register(&UNITY_BYTES_PER_FILE)
        .register(&OPTIMIZATION_LEVEL)
        .register(&FORCE_ENABLE_RTTI)
        .register(&ENABLE_PIE)
        .register(&ENABLE_STACK_PROTECTION)
        .register(&PGO_PROFILE_RATIO)
        .register(&TOOLCHAIN)
        .register(&SHADOW_VARIABLE_ERRORS)
        .register(&LEGACY_PUBLIC_INCLUDE_PATHS)
        .register(&LEGACY_PARENT_INCLUDE_PATHS)
        .register(&CPP_STANDARD)
        .register(&STRICT_CONFORMANCE_MODE)
        .register(&FORCE_COMPILE_DEVELOPMENT_AUTOMATION_TESTS)
        .register(&FORCE_DISABLE_AUTOMATION_TESTS)
        .register(&WITH_AUTOMATION_TESTS)
        .register(&WITH_LOW_LEVEL_TESTS)
        .register(&LAUNCH_MODULE_NAME)
        .register(&ENABLE_PLUGINS)
        .register(&DISABLE_PLUGINS)
        .register(&GLOBAL_DEFINITIONS)
        .register(&PROJECT_DEFINITIONS);
}

/// Returns a [`Schema`] containing every option.
pub fn target_schema() -> Result<Schema, SchemaError> {
    let mut builder = Schema::builder();
    all_options(&mut builder);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoketest_target_schema() {
        let schema = target_schema().unwrap();
        assert!(schema.contains("use_static_crt"));
        assert!(schema.describe("use_static_crt").unwrap().is_environment_critical());
        assert!(!schema.describe("build_environment").unwrap().is_environment_critical());

        // Derived defaults come after the options they read.
        let order: Vec<_> = schema.resolution_order().map(|desc| desc.name()).collect();
        let position = |name: &str| order.iter().position(|n| *n == name).unwrap();
        assert!(position("link_type") < position("build_environment"));
        assert!(position("build_settings_version") < position("cpp_standard"));
        assert!(
            position("force_disable_automation_tests") < position("with_automation_tests")
        );
    }

    #[test]
    fn command_line_flags_are_unique() {
        let schema = target_schema().unwrap();
        let mut seen = std::collections::BTreeSet::new();
        for desc in schema.iter() {
            for flag in desc.command_line() {
                let flag = flag.flag().to_ascii_lowercase();
                assert!(seen.insert(flag.clone()), "flag {flag} used twice");
            }
        }
    }
}
