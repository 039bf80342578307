//! `modkit config`: print the resolved app config

use crate::common::{config_resolver, resolve_project_root};
use crate::errors::CliError;
use crate::GlobalOpts;
use clap::Args;
use colored::Colorize;
use modkit_config::{GetConfigOptions, ProjectConfig};
use modkit_core::RunContext;
use modkit_logger as logger;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone)]
pub struct ConfigCommand {
    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub project_root: Option<PathBuf>,

    /// Config file to use instead of the app.config.* / app.json lookup
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Strip private fields (_internal, hooks, signing metadata)
    #[arg(long)]
    pub public: bool,

    /// Return the config before the `plugins` list is applied
    #[arg(long)]
    pub skip_plugins: bool,

    /// Print only the JSON document
    #[arg(long)]
    pub json: bool,
}

pub fn handle_config(cmd: ConfigCommand, opts: &GlobalOpts) -> Result<(), CliError> {
    let project_root = resolve_project_root(cmd.project_root.as_deref())?;
    let ctx = RunContext::new();
    ctx.begin_run();
    if let Some(config_path) = &cmd.config {
        ctx.config_paths.set(&project_root, Some(config_path.as_path()));
    }

    logger::debug(&format!("Resolving config in {}", project_root.display()));
    let options = GetConfigOptions {
        skip_plugins: cmd.skip_plugins,
        is_public_config: cmd.public,
    };
    let project = config_resolver().get_config(&project_root, options, &ctx)?;

    let rendered = serde_json::to_string_pretty(&project.config.to_value())
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    if cmd.json {
        logger::output(&rendered);
        return Ok(());
    }

    print_sources(&project, opts);
    logger::output(&rendered);
    Ok(())
}

fn print_sources(project: &ProjectConfig, opts: &GlobalOpts) {
    let name = project.config.name().unwrap_or("<unnamed>");
    let version = project.config.version().unwrap_or("-");
    logger::output(&format!("{} {}", name.bold().green(), version.dimmed()));
    if let Some(path) = &project.dynamic_config_path {
        logger::output(&format!("  {} {}", "dynamic config:".cyan(), display(path)));
    }
    if let Some(path) = &project.static_config_path {
        logger::output(&format!("  {} {}", "static config:".cyan(), display(path)));
    }
    if opts.verbosity_level() > 0 {
        logger::output(&format!(
            "  {} {}",
            "package.json:".cyan(),
            display(&project.package_json_path)
        ));
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
