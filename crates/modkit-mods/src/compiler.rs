//! `compile_mods`: install providers, then run every registered chain once

use crate::adapters::AdapterSet;
use crate::paths::ios_project_name;
use crate::providers::{install_base_providers, InstallOptions};
use modkit_core::{AppConfig, ModContext, ModEntry, ModError, ModRequest, Platform, RunContext};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Platforms to compile; `None` reads the config's `platforms` field
    pub platforms: Option<Vec<Platform>>,
    /// Read artifacts and run the chains without writing anything
    pub introspect: bool,
    /// Only install providers for keys some plugin registered
    pub skip_empty_mods: bool,
    /// Fail when a registered chain does not start with a provider
    pub assert_providers: bool,
    pub adapters: AdapterSet,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            platforms: None,
            introspect: false,
            skip_empty_mods: true,
            assert_providers: false,
            adapters: AdapterSet::builtin(),
        }
    }
}

impl CompileOptions {
    pub fn with_platforms(mut self, platforms: Vec<Platform>) -> Self {
        self.platforms = Some(platforms);
        self
    }

    pub fn with_introspect(mut self, introspect: bool) -> Self {
        self.introspect = introspect;
        self
    }

    pub fn with_adapters(mut self, adapters: AdapterSet) -> Self {
        self.adapters = adapters;
        self
    }
}

/// Run every registered mod chain against the native projects under `project_root`
///
/// Keys run one at a time and each sees the config the previous one returned.
/// Optional-artifact failures end up in `ctx.warnings`; anything else aborts.
pub fn compile_mods(
    config: AppConfig,
    project_root: &Path,
    ctx: &RunContext,
    options: &CompileOptions,
) -> Result<AppConfig, ModError> {
    let start = Instant::now();
    let platforms = native_platforms(
        project_root,
        options
            .platforms
            .clone()
            .unwrap_or_else(|| config_platforms(&config)),
    );
    debug!("Compiling mods for {:?}", platforms);

    let install = InstallOptions {
        platforms: platforms.clone(),
        skip_empty_mods: options.skip_empty_mods,
    };
    let mut config = install_base_providers(config, &options.adapters, &install);

    let entries = execution_order(&config, &platforms);
    if options.assert_providers {
        if let Some(entry) = entries.iter().find(|e| !e.chain.is_provider()) {
            return Err(ModError::MissingProvider {
                platform: entry.platform,
                mod_name: entry.mod_name.clone(),
            });
        }
    }

    let ios_name = if platforms.contains(&Platform::Ios) {
        ios_project_name(project_root, &config)
    } else {
        None
    };

    for entry in &entries {
        let project_name = match entry.platform {
            Platform::Ios => ios_name.clone(),
            Platform::Android => None,
        };
        let request = ModRequest::new(project_root, entry.platform, entry.mod_name.as_str())
            .with_project_name(project_name)
            .with_introspect(options.introspect)
            .with_warnings(Arc::clone(&ctx.warnings));

        debug!("Running mod chain {} ({} links)", request.key(), entry.chain.depth());
        let result = entry.chain.invoke(ModContext::new(config, request))?;
        if !result.config.has_mods() {
            return Err(ModError::InvalidModResult {
                platform: entry.platform,
                mod_name: entry.mod_name.clone(),
            });
        }
        config = result.config;
    }

    info!(
        "Compiled {} mod(s) in {:.2}ms",
        entries.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(config)
}

/// `platforms` from the config, ignoring unknown names; every platform when absent
fn config_platforms(config: &AppConfig) -> Vec<Platform> {
    match config.get("platforms").and_then(Value::as_array) {
        Some(names) => names
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|name| name.parse().ok())
            .collect(),
        None => Platform::ALL.to_vec(),
    }
}

/// Platforms that have a native project directory under `project_root`
fn native_platforms(project_root: &Path, platforms: Vec<Platform>) -> Vec<Platform> {
    platforms
        .into_iter()
        .filter(|platform| {
            let exists = project_root.join(platform.as_str()).is_dir();
            if !exists {
                debug!("Skipping {}: no {}/ directory in {}", platform, platform, project_root.display());
            }
            exists
        })
        .collect()
}

/// Registry order, grouped by platform, with `dangerous` first and `finalized` last
fn execution_order(config: &AppConfig, platforms: &[Platform]) -> Vec<ModEntry> {
    let Some(mods) = config.mods() else {
        return Vec::new();
    };
    let mut entries = Vec::with_capacity(mods.len());
    for platform in mods.platforms() {
        if !platforms.contains(&platform) {
            continue;
        }
        let mut group: Vec<ModEntry> = mods.platform_entries(platform).cloned().collect();
        group.sort_by_key(|entry| match entry.mod_name.as_str() {
            "dangerous" => 0,
            "finalized" => 2,
            _ => 1,
        });
        entries.extend(group);
    }
    entries
}
