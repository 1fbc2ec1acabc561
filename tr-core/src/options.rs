//! Every option a target can be configured with.
//!
//! Options are declared as statics so resolver code can read them with their Rust type, e.g.
//! `snapshot.read(&USE_STATIC_CRT)`. Registration happens in [`crate::cfgs`].

use compact_str::CompactString;
use tr_cfg::{
    CliFlag, DefaultContext, DefaultValue, LIST_SEPARATOR, OptionDescriptor, OptionKind,
    OptionValue, Sources, StaticValue, TargetOption, ValueType,
};
use tr_types::{Architecture, Archetype, Configuration};

/// Config file section most build options live in.
pub const BUILD_CONFIGURATION: &str = "BuildConfiguration";

/// Declares a fieldless enum usable as an option value.
macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal) {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const VARIANTS: &'static [&'static str] = &[$($text),+];

            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = tr_types::ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($text) {
                        return Ok($name::$variant);
                    }
                )+
                Err(tr_types::ParseError::new($kind, s))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        tr_cfg::option_enum!($name);
    };
}

named_enum! {
    /// How the modules of a target are linked together.
    pub enum LinkType ("link type") {
        Modular => "modular",
        Monolithic => "monolithic",
    }
}

named_enum! {
    /// Whether a target may share intermediates with other targets.
    pub enum BuildEnvironment ("build environment") {
        Shared => "shared",
        Unique => "unique",
    }
}

named_enum! {
    /// Which generation of defaults a target opts into.
    pub enum BuildSettingsVersion ("build settings version") {
        V1 => "v1",
        V2 => "v2",
        V3 => "v3",
        V4 => "v4",
    }
}

impl BuildSettingsVersion {
    pub const LATEST: BuildSettingsVersion = BuildSettingsVersion::V4;
}

named_enum! {
    /// Include order the engine headers are compiled with.
    pub enum IncludeOrderVersion ("include order") {
        Unreal5_0 => "unreal5_0",
        Unreal5_1 => "unreal5_1",
        Unreal5_2 => "unreal5_2",
        Unreal5_3 => "unreal5_3",
    }
}

impl IncludeOrderVersion {
    pub const OLDEST: IncludeOrderVersion = IncludeOrderVersion::Unreal5_0;
    pub const LATEST: IncludeOrderVersion = IncludeOrderVersion::Unreal5_3;

    /// Versions that have a deprecation define.
    pub const DEPRECATIONS: &'static [IncludeOrderVersion] = &[
        IncludeOrderVersion::Unreal5_1,
        IncludeOrderVersion::Unreal5_2,
        IncludeOrderVersion::Unreal5_3,
    ];

    /// Suffix used in `UE_ENABLE_INCLUDE_ORDER_DEPRECATED_IN_*` defines.
    pub const fn define_suffix(&self) -> &'static str {
        match self {
            IncludeOrderVersion::Unreal5_0 => "5_0",
            IncludeOrderVersion::Unreal5_1 => "5_1",
            IncludeOrderVersion::Unreal5_2 => "5_2",
            IncludeOrderVersion::Unreal5_3 => "5_3",
        }
    }
}

named_enum! {
    pub enum OptimizationMode ("optimization mode") {
        Speed => "speed",
        Size => "size",
        SizeAndSpeed => "size_and_speed",
    }
}

named_enum! {
    pub enum CppStandard ("c++ standard") {
        Cpp17 => "cpp17",
        Cpp20 => "cpp20",
    }
}

// ---- Link and environment ----

pub static LINK_TYPE: TargetOption<LinkType> = TargetOption::new(
    OptionDescriptor::new(
        "link_type",
        "How the modules of the target are linked, archetype presets pick modular or monolithic.",
        ValueType::Enum(LinkType::VARIANTS),
        DefaultValue::Const(StaticValue::Enum("monolithic")),
    )
    .with_command_line(&[
        CliFlag::switch("-Monolithic", "monolithic"),
        CliFlag::switch("-Modular", "modular"),
    ]),
);

pub static BUILD_ENVIRONMENT: TargetOption<BuildEnvironment> = TargetOption::new(
    OptionDescriptor::new(
        "build_environment",
        "Whether the target shares its build environment with other targets.",
        ValueType::Enum(BuildEnvironment::VARIANTS),
        DefaultValue::derived(&["link_type"], default_build_environment),
    )
    .with_command_line(&[
        CliFlag::switch("-SharedBuildEnvironment", "shared"),
        CliFlag::switch("-UniqueBuildEnvironment", "unique"),
    ]),
);

fn default_build_environment(ctx: &DefaultContext<'_>) -> Result<OptionValue, anyhow::Error> {
    let identity = ctx.identity();
    let environment = if identity.archetype() == Archetype::Program && identity.project().is_some()
    {
        BuildEnvironment::Unique
    } else if ctx.read(&LINK_TYPE)? != LinkType::Monolithic {
        BuildEnvironment::Shared
    } else {
        BuildEnvironment::Unique
    };
    Ok(environment.into_value())
}

pub static OVERRIDE_BUILD_ENVIRONMENT: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "override_build_environment",
        "Downgrade conflicts within a shared build environment to warnings.",
        ValueType::Bool,
        DefaultValue::Const(StaticValue::Bool(false)),
    )
    .with_command_line(&[CliFlag::switch("-OverrideBuildEnvironment", "true")])
    .with_config_key(BUILD_CONFIGURATION, "bOverrideBuildEnvironment"),
);

pub static BUILD_SETTINGS_VERSION: TargetOption<BuildSettingsVersion> = TargetOption::new(
    OptionDescriptor::new(
        "build_settings_version",
        "Which generation of defaults the target was written against.",
        ValueType::Enum(BuildSettingsVersion::VARIANTS),
        DefaultValue::Const(StaticValue::Enum("v1")),
    )
    .with_sources(Sources::PROGRAMMATIC),
);

pub static INCLUDE_ORDER_VERSION: TargetOption<IncludeOrderVersion> = TargetOption::new(
    OptionDescriptor::new(
        "include_order_version",
        "Include order of engine headers, forcing it on the command line beats target rules.",
        ValueType::Enum(IncludeOrderVersion::VARIANTS),
        DefaultValue::Const(StaticValue::Enum("unreal5_0")),
    )
    .environment_critical()
    .with_sources(Sources::PROGRAMMATIC.union(Sources::COMMAND_LINE))
    .with_command_line(&[CliFlag::value("-ForceIncludeOrder=")]),
);

// ---- Runtime and binaries ----

pub static USE_STATIC_CRT: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "use_static_crt",
        "Link against the static C runtime.",
        ValueType::Bool,
        DefaultValue::Const(StaticValue::Bool(false)),
    )
    .environment_critical()
    .with_command_line(&[CliFlag::switch("-StaticCRT", "true")])
    .with_config_key(BUILD_CONFIGURATION, "bUseStaticCRT"),
);

pub static DEBUG_BUILDS_USE_DEBUG_CRT: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "debug_builds_use_debug_crt",
        "Debug builds link the debug C runtime.",
        ValueType::Bool,
        DefaultValue::Const(StaticValue::Bool(false)),
    )
    .environment_critical()
    .with_config_key(BUILD_CONFIGURATION, "bDebugBuildsActuallyUseDebugCRT"),
);

pub static UNDECORATED_CONFIGURATION: TargetOption<Configuration> = TargetOption::new(
    OptionDescriptor::new(
        "undecorated_configuration",
        "Configuration whose binaries have no configuration suffix.",
        ValueType::Enum(Configuration::VARIANTS),
        DefaultValue::Const(StaticValue::Enum("development")),
    )
    .environment_critical(),
);

pub static COMPILE_AS_DLL: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "compile_as_dll",
        "Build the target as a shared library instead of an executable.",
        ValueType::Bool,
        DefaultValue::Const(StaticValue::Bool(false)),
    )
    .environment_critical()
    .with_command_line(&[CliFlag::switch("-CompileAsDll", "true")]),
);

pub static CUSTOM_CONFIG: TargetOption<CompactString> = TargetOption::new(
    OptionDescriptor::new(
        "custom_config",
        "Name of an additional config layer baked into the binaries.",
        ValueType::String,
        DefaultValue::Const(StaticValue::String("")),
    )
    .environment_critical()
    .with_command_line(&[CliFlag::value("-CustomConfig=")]),
);

pub static EXE_BINARIES_SUB_FOLDER: TargetOption<CompactString> = TargetOption::new(
    OptionDescriptor::new(
        "exe_binaries_sub_folder",
        "Sub folder executables are placed in.",
        ValueType::String,
        DefaultValue::Const(StaticValue::String("")),
    )
    .environment_critical(),
);

pub static OUTPUT_FILE: TargetOption<std::path::PathBuf> = TargetOption::new(
    OptionDescriptor::new(
        "output_file",
        "Override for the path of the primary binary.",
        ValueType::Path,
        DefaultValue::Const(StaticValue::Path("")),
    )
    .with_command_line(&[CliFlag::value("-OutputFile=")]),
);

pub static TARGET_NAME_OVERRIDE: TargetOption<CompactString> = TargetOption::new(
    OptionDescriptor::new(
        "target_name_override",
        "Name used for output files, target rules take priority over the command line.",
        ValueType::String,
        DefaultValue::Const(StaticValue::String("")),
    )
    .cli_only_if_unset()
    .with_command_line(&[CliFlag::value("-TargetNameOverride=")]),
);

pub static USE_LOGGING_IN_SHIPPING: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "use_logging_in_shipping",
        "Keep logging in shipping builds.",
        ValueType::Bool,
        DefaultValue::Const(StaticValue::Bool(false)),
    )
    .environment_critical()
    .with_config_key(BUILD_CONFIGURATION, "bUseLoggingInShipping"),
);

pub static BUILD_ADDITIONAL_CONSOLE_APP: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "build_additional_console_app",
        "Also produce a console flavored executable.",
        ValueType::Bool,
        DefaultValue::Const(StaticValue::Bool(true)),
    ),
);

// ---- Feature toggles ----

pub static USE_VERSE: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "use_verse",
        "Compile in the Verse language runtime.",
        ValueType::Bool,
        DefaultValue::Const(StaticValue::Bool(true)),
    )
    .environment_critical()
    .with_command_line(&[
        CliFlag::switch("-UseVerse", "true"),
        CliFlag::switch("-NoUseVerse", "false"),
    ])
    .with_config_key(BUILD_CONFIGURATION, "bUseVerse"),
);

pub static USE_IRIS: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "use_iris",
        "Compile in the Iris replication system.",
        ValueType::Bool,
        DefaultValue::Const(StaticValue::Bool(true)),
    )
    .environment_critical()
    .with_command_line(&[
        CliFlag::switch("-UseIris", "true"),
        CliFlag::switch("-NoUseIris", "false"),
    ]),
);

pub static COMPILE_AGAINST_ENGINE: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "compile_against_engine",
        "Link the engine into the target.",
        ValueType::Bool,
        DefaultValue::Const(StaticValue::Bool(true)),
    )
    .environment_critical(),
);

pub static COMPILE_AGAINST_CORE_UOBJECT: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "compile_against_core_uobject",
        "Link the object system into the target.",
        ValueType::Bool,
        DefaultValue::Const(StaticValue::Bool(true)),
    )
    .environment_critical(),
);

pub static COMPILE_AGAINST_EDITOR: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "compile_against_editor",
        "Link editor code into the target.",
        ValueType::Bool,
        DefaultValue::derived(&[], |ctx| {
            Ok(OptionValue::Bool(ctx.identity().archetype() == Archetype::Editor))
        }),
    )
    .environment_critical(),
);

pub static BUILD_REQUIRES_COOKED_DATA: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "build_requires_cooked_data",
        "The target only runs against cooked content.",
        ValueType::Bool,
        DefaultValue::derived(&[], |ctx| {
            let archetype = ctx.identity().archetype();
            let cooked = matches!(
                archetype,
                Archetype::Game | Archetype::Client | Archetype::Server
            );
            Ok(OptionValue::Bool(cooked))
        }),
    )
    .environment_critical(),
);

pub static BUILD_WITH_EDITOR_ONLY_DATA: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "build_with_editor_only_data",
        "Keep editor only data in the build.",
        ValueType::Bool,
        DefaultValue::derived(&[], |ctx| {
            let archetype = ctx.identity().archetype();
            let editor_data = matches!(archetype, Archetype::Editor | Archetype::Program);
            Ok(OptionValue::Bool(editor_data))
        }),
    )
    .environment_critical(),
);

pub static BUILD_DEVELOPER_TOOLS: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "build_developer_tools",
        "Compile developer tools into the target.",
        ValueType::Bool,
        DefaultValue::derived(&["compile_against_engine"], |ctx| {
            let identity = ctx.identity();
            let tools_target = matches!(identity.archetype(), Archetype::Editor | Archetype::Program);
            let tools = ctx.read(&COMPILE_AGAINST_ENGINE)?
                && (tools_target || !identity.configuration().is_release());
            Ok(OptionValue::Bool(tools))
        }),
    )
    .environment_critical(),
);

pub static WITH_SERVER_CODE: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "with_server_code",
        "Compile server only code.",
        ValueType::Bool,
        DefaultValue::derived(&[], |ctx| {
            Ok(OptionValue::Bool(ctx.identity().archetype() != Archetype::Client))
        }),
    )
    .environment_critical(),
);

pub static WITH_PUSH_MODEL: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "with_push_model",
        "Compile in push model replication.",
        ValueType::Bool,
        DefaultValue::derived(&[], |ctx| {
            Ok(OptionValue::Bool(ctx.identity().archetype() == Archetype::Editor))
        }),
    )
    .environment_critical(),
);

pub static WITH_PERF_COUNTERS: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "with_perf_counters",
        "Compile in performance counters.",
        ValueType::Bool,
        DefaultValue::derived(&[], |ctx| {
            let archetype = ctx.identity().archetype();
            Ok(OptionValue::Bool(matches!(
                archetype,
                Archetype::Editor | Archetype::Server
            )))
        }),
    )
    .environment_critical()
    .with_config_key(BUILD_CONFIGURATION, "bWithPerfCounters"),
);

pub static WITH_LIVE_CODING: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "with_live_coding",
        "Compile in support for patching code while running.",
        ValueType::Bool,
        DefaultValue::derived(&[], default_live_coding),
    )
    .environment_critical(),
);

fn default_live_coding(ctx: &DefaultContext<'_>) -> Result<OptionValue, anyhow::Error> {
    let identity = ctx.identity();
    let live_coding = identity.platform().as_str() == "Win64"
        && identity.architectures().contains(&Architecture::X86_64)
        && !identity.configuration().is_release()
        && identity.archetype() != Archetype::Program;
    Ok(OptionValue::Bool(live_coding))
}

pub static ALLOW_HOT_RELOAD: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "allow_hot_reload",
        "Modules can be reloaded while the editor runs.",
        ValueType::Bool,
        DefaultValue::derived(&["link_type"], |ctx| {
            let hot_reload = ctx.identity().archetype() == Archetype::Editor
                && ctx.read(&LINK_TYPE)? == LinkType::Modular
                && ctx.modules().any_can_hot_reload();
            Ok(OptionValue::Bool(hot_reload))
        }),
    ),
);

pub static USE_SHARED_PCHS: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "use_shared_pchs",
        "Generate shared precompiled headers.",
        ValueType::Bool,
        DefaultValue::derived(&[], |ctx| {
            Ok(OptionValue::Bool(ctx.modules().any_wants_shared_pch()))
        }),
    )
    .environment_critical()
    .with_command_line(&[CliFlag::switch("-NoSharedPCH", "false")]),
);

// ---- Compilation ----

pub static USE_UNITY_BUILD: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "use_unity_build",
        "Combine source files into larger translation units.",
        ValueType::Bool,
        DefaultValue::Const(StaticValue::Bool(true)),
    )
    .with_command_line(&[CliFlag::switch("-DisableUnity", "false")])
    .with_config_key(BUILD_CONFIGURATION, "bUseUnityBuild"),
);

pub static UNITY_BYTES_PER_FILE: TargetOption<i64> = TargetOption::new(
    OptionDescriptor::new(
        "unity_bytes_per_file",
        "Target size of a combined translation unit.",
        ValueType::Integer,
        DefaultValue::Const(StaticValue::Integer(384 * 1024)),
    )
    .with_command_line(&[CliFlag::value("-BytesPerUnityCPP=")])
    .with_config_key(BUILD_CONFIGURATION, "NumIncludedBytesPerUnityCPP"),
);

pub static OPTIMIZATION_LEVEL: TargetOption<OptimizationMode> = TargetOption::new(
    OptionDescriptor::new(
        "optimization_level",
        "What the optimizer favors.",
        ValueType::Enum(OptimizationMode::VARIANTS),
        DefaultValue::Const(StaticValue::Enum("speed")),
    )
    .environment_critical()
    .with_command_line(&[CliFlag::value("-OptimizationLevel=")])
    .with_config_key(BUILD_CONFIGURATION, "OptimizationLevel"),
);

pub static FORCE_ENABLE_RTTI: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "force_enable_rtti",
        "Enable run-time type information for every module.",
        ValueType::Bool,
        DefaultValue::Const(StaticValue::Bool(false)),
    )
    .environment_critical()
    .with_command_line(&[CliFlag::switch("-rtti", "true")]),
);

pub static ENABLE_PIE: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "enable_pie",
        "Produce position independent executables.",
        ValueType::Bool,
        DefaultValue::Const(StaticValue::Bool(false)),
    )
    .with_command_line(&[CliFlag::switch("-pie", "true")]),
);

pub static ENABLE_STACK_PROTECTION: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "enable_stack_protection",
        "Compile with stack protection.",
        ValueType::Bool,
        DefaultValue::Const(StaticValue::Bool(false)),
    )
    .with_command_line(&[CliFlag::switch("-stack-protect", "true")]),
);

pub static PGO_PROFILE_RATIO: TargetOption<f64> = TargetOption::new(
    OptionDescriptor::new(
        "pgo_profile_ratio",
        "Fraction of functions instrumented when profiling.",
        ValueType::Float,
        DefaultValue::Const(StaticValue::Float(1.0)),
    )
    .with_command_line(&[CliFlag::value("-PGOProfileRatio=")]),
);

pub static TOOLCHAIN: TargetOption<CompactString> = TargetOption::new(
    OptionDescriptor::new(
        "toolchain",
        "Compiler toolchain, defaults to the platform's toolchain.",
        ValueType::String,
        DefaultValue::derived(&[], |ctx| {
            Ok(OptionValue::String(ctx.platform().default_toolchain.clone()))
        }),
    )
    .environment_critical()
    .with_command_line(&[CliFlag::value("-Toolchain=")]),
);

// ---- Versioned defaults ----

pub static SHADOW_VARIABLE_ERRORS: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "shadow_variable_errors",
        "Treat shadowed variables as errors.",
        ValueType::Bool,
        DefaultValue::derived(&["build_settings_version"], |ctx| {
            let version = ctx.read(&BUILD_SETTINGS_VERSION)?;
            Ok(OptionValue::Bool(version >= BuildSettingsVersion::V2))
        }),
    )
    .environment_critical()
    .with_command_line(&[CliFlag::switch("-ShadowVariableErrors", "true")]),
);

pub static LEGACY_PUBLIC_INCLUDE_PATHS: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "legacy_public_include_paths",
        "Add every public sub folder to the include paths.",
        ValueType::Bool,
        DefaultValue::derived(&["build_settings_version"], |ctx| {
            let version = ctx.read(&BUILD_SETTINGS_VERSION)?;
            Ok(OptionValue::Bool(version < BuildSettingsVersion::V2))
        }),
    )
    .environment_critical(),
);

pub static LEGACY_PARENT_INCLUDE_PATHS: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "legacy_parent_include_paths",
        "Add module parent folders to the include paths.",
        ValueType::Bool,
        DefaultValue::derived(&["build_settings_version"], |ctx| {
            let version = ctx.read(&BUILD_SETTINGS_VERSION)?;
            Ok(OptionValue::Bool(version < BuildSettingsVersion::V3))
        }),
    )
    .environment_critical(),
);

pub static CPP_STANDARD: TargetOption<CppStandard> = TargetOption::new(
    OptionDescriptor::new(
        "cpp_standard",
        "C++ language standard.",
        ValueType::Enum(CppStandard::VARIANTS),
        DefaultValue::derived(&["build_settings_version"], |ctx| {
            let standard = if ctx.read(&BUILD_SETTINGS_VERSION)? >= BuildSettingsVersion::V4 {
                CppStandard::Cpp20
            } else {
                CppStandard::Cpp17
            };
            Ok(standard.into_value())
        }),
    )
    .environment_critical()
    .with_command_line(&[CliFlag::value("-CppStd=")]),
);

pub static STRICT_CONFORMANCE_MODE: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "strict_conformance_mode",
        "Ask the compiler for strict standard conformance.",
        ValueType::Bool,
        DefaultValue::derived(&["build_settings_version"], |ctx| {
            let version = ctx.read(&BUILD_SETTINGS_VERSION)?;
            Ok(OptionValue::Bool(version >= BuildSettingsVersion::V4))
        }),
    )
    .environment_critical(),
);

// ---- Tests ----

pub static FORCE_COMPILE_DEVELOPMENT_AUTOMATION_TESTS: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "force_compile_development_automation_tests",
        "Compile development automation tests regardless of configuration.",
        ValueType::Bool,
        DefaultValue::Const(StaticValue::Bool(false)),
    )
    .with_config_key(BUILD_CONFIGURATION, "bForceCompileDevelopmentAutomationTests"),
);

pub static FORCE_DISABLE_AUTOMATION_TESTS: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "force_disable_automation_tests",
        "Never compile development automation tests.",
        ValueType::Bool,
        DefaultValue::Const(StaticValue::Bool(false)),
    )
    .with_config_key(BUILD_CONFIGURATION, "bForceDisableAutomationTests"),
);

pub static WITH_AUTOMATION_TESTS: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "with_automation_tests",
        "Compile development automation tests.",
        ValueType::Bool,
        DefaultValue::derived(
            &[
                "force_compile_development_automation_tests",
                "force_disable_automation_tests",
            ],
            |ctx| {
                let enabled = if ctx.read(&FORCE_COMPILE_DEVELOPMENT_AUTOMATION_TESTS)? {
                    true
                } else if ctx.read(&FORCE_DISABLE_AUTOMATION_TESTS)? {
                    false
                } else {
                    ctx.identity().configuration() != Configuration::Shipping
                };
                Ok(OptionValue::Bool(enabled))
            },
        ),
    ),
);

pub static WITH_LOW_LEVEL_TESTS: TargetOption<bool> = TargetOption::new(
    OptionDescriptor::new(
        "with_low_level_tests",
        "Compile low level tests.",
        ValueType::Bool,
        DefaultValue::derived(&[], |ctx| {
            Ok(OptionValue::Bool(ctx.identity().archetype() == Archetype::Test))
        }),
    ),
);

pub static LAUNCH_MODULE_NAME: TargetOption<CompactString> = TargetOption::new(
    OptionDescriptor::new(
        "launch_module_name",
        "Module that provides the entry point.",
        ValueType::String,
        DefaultValue::derived(&[], |ctx| {
            let name = match ctx.identity().archetype() {
                Archetype::Program => "",
                _ => "Launch",
            };
            Ok(OptionValue::String(CompactString::const_new(name)))
        }),
    ),
);

// ---- Lists ----

pub static ENABLE_PLUGINS: TargetOption<Vec<CompactString>> = TargetOption::new(
    OptionDescriptor::new(
        "enable_plugins",
        "Plugins to enable in addition to the project's.",
        ValueType::StringList,
        DefaultValue::Const(StaticValue::EmptyList),
    )
    .with_command_line(&[CliFlag::list("-EnablePlugin=", LIST_SEPARATOR)]),
);

pub static DISABLE_PLUGINS: TargetOption<Vec<CompactString>> = TargetOption::new(
    OptionDescriptor::new(
        "disable_plugins",
        "Plugins to disable.",
        ValueType::StringList,
        DefaultValue::Const(StaticValue::EmptyList),
    )
    .with_command_line(&[CliFlag::list("-DisablePlugin=", LIST_SEPARATOR)]),
);

pub static GLOBAL_DEFINITIONS: TargetOption<Vec<CompactString>> = TargetOption::new(
    OptionDescriptor::new(
        "global_definitions",
        "Extra definitions for every module in the target.",
        ValueType::StringList,
        DefaultValue::Const(StaticValue::EmptyList),
    )
    .with_command_line(&[CliFlag::value("-Define:")]),
);

pub static PROJECT_DEFINITIONS: TargetOption<Vec<CompactString>> = TargetOption::new(
    OptionDescriptor::new(
        "project_definitions",
        "Extra definitions for modules of the project.",
        ValueType::StringList,
        DefaultValue::Const(StaticValue::EmptyList),
    )
    .with_command_line(&[CliFlag::value("-ProjectDefine:")]),
);
