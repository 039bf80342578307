use super::chain::ModChain;
use crate::platform::Platform;
use ahash::AHashMap;
use std::fmt;

/// One registered `(platform, mod)` key and its composed chain
#[derive(Clone)]
pub struct ModEntry {
    pub platform: Platform,
    pub mod_name: String,
    pub chain: ModChain,
}

impl fmt::Debug for ModEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} -> {:?}", self.platform, self.mod_name, self.chain)
    }
}

/// Insertion-ordered map of `(platform, mod)` to exactly one composed chain
#[derive(Clone, Default)]
pub struct ModRegistry {
    entries: Vec<ModEntry>,

    /// Runtime only - entry index for O(1) lookup by key
    index: AHashMap<Platform, AHashMap<String, usize>>,
}

impl ModRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// O(1) chain lookup by key
    #[inline]
    pub fn get(&self, platform: Platform, mod_name: &str) -> Option<&ModChain> {
        self.index
            .get(&platform)
            .and_then(|mods| mods.get(mod_name))
            .map(|&idx| &self.entries[idx].chain)
    }

    pub fn contains(&self, platform: Platform, mod_name: &str) -> bool {
        self.get(platform, mod_name).is_some()
    }

    /// Store the chain for a key; replacing keeps the key's original position
    pub fn insert(&mut self, platform: Platform, mod_name: &str, chain: ModChain) -> Option<ModChain> {
        if let Some(&idx) = self.index.get(&platform).and_then(|mods| mods.get(mod_name)) {
            return Some(std::mem::replace(&mut self.entries[idx].chain, chain));
        }

        let idx = self.entries.len();
        self.entries.push(ModEntry {
            platform,
            mod_name: mod_name.to_string(),
            chain,
        });
        self.index
            .entry(platform)
            .or_default()
            .insert(mod_name.to_string(), idx);
        None
    }

    pub fn entries(&self) -> &[ModEntry] {
        &self.entries
    }

    /// Platforms in order of their first registration
    pub fn platforms(&self) -> Vec<Platform> {
        let mut platforms = Vec::new();
        for entry in &self.entries {
            if !platforms.contains(&entry.platform) {
                platforms.push(entry.platform);
            }
        }
        platforms
    }

    /// Entries of one platform in insertion order
    pub fn platform_entries(&self, platform: Platform) -> impl Iterator<Item = &ModEntry> + '_ {
        self.entries
            .iter()
            .filter(move |entry| entry.platform == platform)
    }

    pub fn mod_names(&self, platform: Platform) -> Vec<&str> {
        self.platform_entries(platform)
            .map(|entry| entry.mod_name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ModRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}
