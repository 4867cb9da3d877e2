use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use render_command::config::{Overrides, RenderConfig};
use render_command::mu_plugin::{InstallOutcome, InstallState, MuPlugin, UninstallOutcome};
use render_command::render::{self, OutputFormat, RenderArgs};

#[derive(Parser)]
#[command(
    name = "render-command",
    version,
    about = "Render a WordPress page, optionally with selected plugins switched off"
)]
struct Cli {
    /// WordPress root directory (defaults to searching upward from the current directory)
    #[arg(long = "path", global = true, env = "RENDER_COMMAND_WP_PATH")]
    wp_path: Option<PathBuf>,

    /// Site URL that request paths are joined onto
    #[arg(long, global = true, env = "RENDER_COMMAND_URL")]
    url: Option<String>,

    /// Must-use plugins directory (defaults to <path>/wp-content/mu-plugins)
    #[arg(long, global = true)]
    mu_plugins_dir: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a site path and print its HTML or status code
    Render {
        /// Site-relative URL path (e.g. "/about-us/")
        path: String,
        /// Comma-separated plugin slugs to switch off for this request
        #[arg(long, value_name = "PLUGINS")]
        without_plugins: Option<String>,
        /// What to print
        #[arg(long, value_enum, default_value_t = OutputFormat::Raw)]
        format: OutputFormat,
        /// Request timeout in seconds (default: 120)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,
    },
    /// Manage the must-use plugin that applies exclusions on the site
    MuPlugin {
        #[command(subcommand)]
        action: MuPluginAction,
    },
    /// Print the exclusion token for the configured salt
    Token,
}

#[derive(Subcommand)]
enum MuPluginAction {
    /// Write the must-use plugin file
    Install,
    /// Remove the must-use plugin file
    Uninstall,
    /// Show whether the must-use plugin file is present
    Status,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let timeout_secs = match &cli.command {
        Commands::Render { timeout, .. } => *timeout,
        _ => None,
    };
    let overrides = Overrides {
        wp_path: cli.wp_path,
        site_url: cli.url,
        mu_plugins_dir: cli.mu_plugins_dir,
        timeout_secs,
    };
    let config = match RenderConfig::load(overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[render-command] error: {e:#}");
            std::process::exit(1);
        }
    };

    let exit_code = match cli.command {
        Commands::Render {
            path,
            without_plugins,
            format,
            ..
        } => cmd_render(
            &config,
            &RenderArgs {
                path,
                without_plugins,
                format,
            },
        ),
        Commands::MuPlugin { action } => cmd_mu_plugin(&config, &action),
        Commands::Token => cmd_token(&config),
    };
    std::process::exit(exit_code);
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "render_command=debug,render_core=debug"
    } else {
        "render_command=warn,render_core=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn cmd_render(config: &RenderConfig, args: &RenderArgs) -> i32 {
    match render::render(config, args) {
        Ok(output) => {
            println!("{output}");
            0
        }
        Err(e) => {
            eprintln!("[render-command] error: {e:#}");
            1
        }
    }
}

fn cmd_mu_plugin(config: &RenderConfig, action: &MuPluginAction) -> i32 {
    let dir = match config.require_mu_plugins_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("[render-command] error: {e:#}");
            return 1;
        }
    };
    let plugin = MuPlugin::in_dir(dir);
    let path = plugin.path().display();

    match action {
        MuPluginAction::Install => match plugin.install() {
            Ok(InstallOutcome::Installed) => eprintln!("[render-command] mu-plugin installed: {path}"),
            Ok(InstallOutcome::Updated) => eprintln!("[render-command] mu-plugin updated: {path}"),
            Ok(InstallOutcome::AlreadyInstalled) => {
                eprintln!("[render-command] mu-plugin already installed: {path}");
            }
            Err(e) => {
                eprintln!("[render-command] error: {e:#}");
                return 1;
            }
        },
        MuPluginAction::Uninstall => match plugin.uninstall() {
            Ok(UninstallOutcome::Removed) => eprintln!("[render-command] mu-plugin removed: {path}"),
            Ok(UninstallOutcome::NotInstalled) => {
                eprintln!("[render-command] mu-plugin not installed: {path}");
            }
            Err(e) => {
                eprintln!("[render-command] error: {e:#}");
                return 1;
            }
        },
        MuPluginAction::Status => match plugin.state() {
            InstallState::Installed => println!("installed: {path}"),
            InstallState::NotInstalled => println!("not installed: {path}"),
        },
    }
    0
}

fn cmd_token(config: &RenderConfig) -> i32 {
    println!("{}", config.token_authority().derive_token());
    0
}
