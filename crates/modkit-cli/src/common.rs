//! Common types and utilities shared across commands

use crate::errors::CliError;
use clap::Parser;
use modkit_config::ConfigResolver;
use modkit_core::{ConfigPlugin, Platform};
use modkit_logger as logger;
use modkit_plugins::{PluginCatalog, PluginLoader, ResolvedModule};
use std::path::{Path, PathBuf};

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Decrease verbosity")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,
}

impl GlobalOpts {
    /// Effective verbosity: 0 quiet, 1 debug (-v), 2 trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

/// The given project root, or the working directory; must be a directory
pub fn resolve_project_root(project_root: Option<&Path>) -> Result<PathBuf, CliError> {
    let root = match project_root {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir()?,
    };
    if !root.is_dir() {
        return Err(CliError::ProjectRoot(root));
    }
    Ok(root)
}

/// `--platform` values, or every platform when none were given
pub fn selected_platforms(platforms: &[Platform]) -> Vec<Platform> {
    if platforms.is_empty() {
        Platform::ALL.to_vec()
    } else {
        let mut selected = Vec::with_capacity(platforms.len());
        for platform in platforms {
            if !selected.contains(platform) {
                selected.push(*platform);
            }
        }
        selected
    }
}

/// Loader that turns plugin modules nothing can load into no-ops
///
/// Installed plugin packages are JavaScript; the CLI only runs the plugins it
/// ships, so the rest are reported and skipped rather than failing the run.
pub struct SkippingLoader<L> {
    inner: L,
}

impl<L: PluginLoader> SkippingLoader<L> {
    pub fn new(inner: L) -> Self {
        SkippingLoader { inner }
    }
}

impl<L: PluginLoader> PluginLoader for SkippingLoader<L> {
    fn load(&self, module: &ResolvedModule) -> Option<ConfigPlugin> {
        if let Some(plugin) = self.inner.load(module) {
            return Some(plugin);
        }
        logger::warn(&format!(
            "Skipping plugin {}: {} is not a built-in plugin and JavaScript plugins are not run",
            module.request,
            module.path.display()
        ));
        Some(ConfigPlugin::new(&module.request, |config, _props| Ok(config)))
    }
}

/// Config resolver used by every command
pub fn config_resolver() -> ConfigResolver {
    ConfigResolver::default().with_loader(SkippingLoader::new(PluginCatalog::new()))
}
