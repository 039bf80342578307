use anyhow::Context;
use clap::{Parser, Subcommand};
use modkit::{
    commands::{
        config::{handle_config, ConfigCommand},
        prebuild::{handle_prebuild, PrebuildCommand},
    },
    GlobalOpts,
};
use modkit_logger as logger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "modkit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "App config and native project modifier",
    long_about = "modkit resolves app configs, applies config plugins and writes their mods into the native projects.\n\n\
Entries of the config's `plugins` list are resolved from node_modules. Only the plugins built into modkit run; \
JavaScript plugin packages are skipped with a warning."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved app config
    Config(ConfigCommand),
    /// Apply config plugins and mods to the native projects
    Prebuild(PrebuildCommand),
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(logger::verbosity_to_filter())),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), false) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing();

    let result: anyhow::Result<()> = match cli.command {
        Commands::Config(cmd) => {
            handle_config(cmd, &cli.global).context("Failed to resolve the app config")
        }
        Commands::Prebuild(cmd) => handle_prebuild(cmd, &cli.global).context("Prebuild failed"),
    };

    if let Err(e) = result {
        logger::error(&format!("{:#}", e));
        if cli.global.verbosity_level() > 0 {
            logger::show_log_path();
        }
        std::process::exit(1);
    }
}
