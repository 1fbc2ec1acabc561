//! Registry of the platforms targets can be built for.

use std::collections::BTreeMap;

use compact_str::CompactString;
use tr_ore::assert_none;
use tr_types::{Architecture, ArchitectureSet, Configuration, PlatformId, PlatformSupport};

/// Platform name to what that platform can build.
#[derive(Debug, Clone, Default)]
pub struct PlatformRegistry {
    platforms: BTreeMap<PlatformId, PlatformSupport>,
}

impl PlatformRegistry {
    /// Register a platform.
    ///
    /// # Panics
    /// * If a platform with the same name was already registered.
    pub fn register(&mut self, support: PlatformSupport) -> &mut Self {
        let name = support.platform.clone();
        let prev = self.platforms.insert(name.clone(), support);
        assert_none!(prev, "platform '{name}' registered more than once");
        self
    }

    pub fn get(&self, platform: &PlatformId) -> Option<&PlatformSupport> {
        self.platforms.get(platform)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlatformSupport> {
        self.platforms.values()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// Registry with the common desktop platforms, used when a plan does not declare any.
    pub fn desktop() -> Self {
        let every_configuration = || {
            vec![
                Configuration::Debug,
                Configuration::DebugGame,
                Configuration::Development,
                Configuration::Shipping,
                Configuration::Test,
            ]
        };
        let x64_and_arm = || {
            ArchitectureSet::new([
                Architecture::X86_64,
                Architecture::Aarch64(target_lexicon::Aarch64Architecture::Aarch64),
            ])
        };

        let mut registry = PlatformRegistry::default();
        registry
            .register(PlatformSupport {
                platform: PlatformId::new("Win64"),
                configurations: every_configuration(),
                architectures: x64_and_arm(),
                default_toolchain: CompactString::const_new("msvc"),
            })
            .register(PlatformSupport {
                platform: PlatformId::new("Linux"),
                configurations: every_configuration(),
                architectures: x64_and_arm(),
                default_toolchain: CompactString::const_new("clang"),
            })
            .register(PlatformSupport {
                platform: PlatformId::new("Mac"),
                configurations: every_configuration(),
                architectures: x64_and_arm(),
                default_toolchain: CompactString::const_new("apple-clang"),
            });
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoketest_desktop() {
        let registry = PlatformRegistry::desktop();
        let linux = registry.get(&PlatformId::new("Linux")).unwrap();
        assert!(linux.supports_configuration(Configuration::Shipping));
        assert!(linux.supports_architectures(&ArchitectureSet::single(Architecture::X86_64)));
        assert!(registry.get(&PlatformId::new("Switch")).is_none());
    }

    #[test]
    #[should_panic(expected = "registered more than once")]
    fn duplicate_platform_panics() {
        let mut registry = PlatformRegistry::desktop();
        registry.register(PlatformSupport {
            platform: PlatformId::new("Linux"),
            configurations: vec![],
            architectures: ArchitectureSet::default(),
            default_toolchain: CompactString::const_new("gcc"),
        });
    }
}
