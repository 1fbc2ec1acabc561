//! Layered key/value config files, already loaded into memory.

use std::collections::BTreeMap;

use compact_str::CompactString;
use smallvec::SmallVec;
use tr_types::PlatformId;

/// A single value in a config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEntry {
    Value(String),
    Array(Vec<String>),
}

/// One layer of config, sections of keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    sections: BTreeMap<CompactString, BTreeMap<CompactString, ConfigEntry>>,
}

impl ConfigFile {
    pub fn set_value(&mut self, section: &str, key: &str, value: impl Into<String>) -> &mut Self {
        self.insert(section, key, ConfigEntry::Value(value.into()))
    }

    pub fn set_array<I, S>(&mut self, section: &str, key: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.insert(section, key, ConfigEntry::Array(values))
    }

    fn insert(&mut self, section: &str, key: &str, entry: ConfigEntry) -> &mut Self {
        self.sections
            .entry(CompactString::new(section))
            .or_default()
            .insert(CompactString::new(key), entry);
        self
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&ConfigEntry> {
        self.sections.get(section)?.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Base config plus per-platform layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFiles {
    base: ConfigFile,
    platforms: BTreeMap<PlatformId, ConfigFile>,
}

impl ConfigFiles {
    pub fn base_mut(&mut self) -> &mut ConfigFile {
        &mut self.base
    }

    pub fn platform_mut(&mut self, platform: PlatformId) -> &mut ConfigFile {
        self.platforms.entry(platform).or_default()
    }

    /// Returns the view of config a target on `platform` sees.
    pub fn hierarchy(&self, platform: &PlatformId) -> ConfigHierarchy<'_> {
        let mut layers = SmallVec::new();
        if let Some(layer) = self.platforms.get(platform) {
            layers.push(layer);
        }
        layers.push(&self.base);
        ConfigHierarchy { layers }
    }
}

/// Config files as seen by a single platform, the most specific layer comes first.
#[derive(Debug, Clone)]
pub struct ConfigHierarchy<'a> {
    layers: SmallVec<[&'a ConfigFile; 2]>,
}

impl<'a> ConfigHierarchy<'a> {
    fn lookup(&self, section: &str, key: &str) -> Option<&'a ConfigEntry> {
        self.layers.iter().find_map(|layer| layer.get(section, key))
    }

    /// Returns the scalar value for `key`, `None` if it is missing or an array.
    pub fn get_value(&self, section: &str, key: &str) -> Option<&'a str> {
        match self.lookup(section, key)? {
            ConfigEntry::Value(value) => Some(value.as_str()),
            ConfigEntry::Array(_) => None,
        }
    }

    /// Returns the values for `key`, a scalar is treated as a single item array.
    pub fn get_array(&self, section: &str, key: &str) -> Option<&'a [String]> {
        match self.lookup(section, key)? {
            ConfigEntry::Value(value) => Some(std::slice::from_ref(value)),
            ConfigEntry::Array(values) => Some(values.as_slice()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoketest_hierarchy() {
        let mut files = ConfigFiles::default();
        files
            .base_mut()
            .set_value("BuildConfiguration", "bUseStaticCRT", "false")
            .set_value("BuildConfiguration", "bUseUnityBuild", "true");
        files
            .platform_mut(PlatformId::new("Linux"))
            .set_value("BuildConfiguration", "bUseStaticCRT", "true");

        let linux = files.hierarchy(&PlatformId::new("Linux"));
        assert_eq!(linux.get_value("BuildConfiguration", "bUseStaticCRT"), Some("true"));
        assert_eq!(linux.get_value("BuildConfiguration", "bUseUnityBuild"), Some("true"));

        let mac = files.hierarchy(&PlatformId::new("Mac"));
        assert_eq!(mac.get_value("BuildConfiguration", "bUseStaticCRT"), Some("false"));
        assert_eq!(mac.get_value("BuildConfiguration", "Missing"), None);
    }

    #[test]
    fn arrays_and_values() {
        let mut files = ConfigFiles::default();
        files
            .base_mut()
            .set_array("CookedEditorSettings", "DisabledPlugins", ["A", "B"])
            .set_value("CookedEditorSettings", "Single", "C");

        let config = files.hierarchy(&PlatformId::new("Linux"));
        assert_eq!(
            config.get_array("CookedEditorSettings", "DisabledPlugins"),
            Some(&["A".to_string(), "B".to_string()][..])
        );
        assert_eq!(config.get_value("CookedEditorSettings", "DisabledPlugins"), None);
        assert_eq!(
            config.get_array("CookedEditorSettings", "Single"),
            Some(&["C".to_string()][..])
        );
    }
}
