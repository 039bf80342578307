//! `modkit prebuild`: resolve the config and apply every mod to the native projects

use crate::common::{config_resolver, resolve_project_root, selected_platforms};
use crate::errors::CliError;
use crate::GlobalOpts;
use clap::Args;
use modkit_config::GetConfigOptions;
use modkit_core::{Platform, RunContext};
use modkit_logger as logger;
use modkit_mods::{compile_mods, with_builtin_plugins, CompileOptions};
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug, Clone)]
pub struct PrebuildCommand {
    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub project_root: Option<PathBuf>,

    /// Platform to modify; repeat for several (defaults to all)
    #[arg(long = "platform", value_name = "PLATFORM")]
    pub platforms: Vec<Platform>,

    /// Run every mod and read every artifact, but write nothing
    #[arg(long)]
    pub introspect: bool,

    /// Install providers for every known artifact, not only the ones plugins touch
    #[arg(long)]
    pub all_providers: bool,

    /// Fail when a registered mod has no provider
    #[arg(long)]
    pub strict: bool,
}

pub fn handle_prebuild(cmd: PrebuildCommand, _opts: &GlobalOpts) -> Result<(), CliError> {
    let project_root = resolve_project_root(cmd.project_root.as_deref())?;
    let platforms = selected_platforms(&cmd.platforms);
    let ctx = RunContext::new();
    ctx.begin_run();

    let project =
        config_resolver().get_config(&project_root, GetConfigOptions::default(), &ctx)?;
    let config = with_builtin_plugins(project.config)?;

    let options = CompileOptions {
        introspect: cmd.introspect,
        skip_empty_mods: !cmd.all_providers,
        assert_providers: cmd.strict,
        ..CompileOptions::default()
    }
    .with_platforms(platforms.clone());
    debug!(?options, "Compiling mods");

    logger::spinner_start("Applying mods");
    if let Err(e) = compile_mods(config, &project_root, &ctx, &options) {
        logger::spinner_error("Mods failed");
        return Err(e.into());
    }

    let names: Vec<&str> = platforms
        .iter()
        .filter(|p| project_root.join(p.as_str()).is_dir())
        .map(|p| p.as_str())
        .collect();
    if cmd.introspect {
        logger::spinner_success(&format!("Introspected {}", names.join(", ")));
    } else {
        logger::spinner_success(&format!("Prebuild finished for {}", names.join(", ")));
    }

    for (platform, warnings) in ctx.warnings.flush_all() {
        for warning in warnings {
            logger::platform_warning(
                platform.as_str(),
                &warning.tag,
                &warning.message,
                warning.link.as_deref(),
            );
        }
    }
    Ok(())
}
