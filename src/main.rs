//! kitchen: Chef inventory dashboard
//!
//! Serves a browsable view of the nodes and roles of a LittleChef kitchen
//! and offers the same queries on the command line.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use kitchen::{
    cli::{self, NodeQuery, OutputFormat, OutputTarget},
    config::{AppConfig, Validatable, CONFIG_FILE_NAMES},
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "kitchen")]
#[command(version)]
#[command(about = "Dashboard and queries for a LittleChef kitchen", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Serve the dashboard for ./chef-repo
    kitchen --repo-name chef-repo serve --port 8000

    # Production web servers as a table
    kitchen nodes --env production --roles webserver -o table

    # Node map of the staging environment
    kitchen graph --env staging > staging.dot")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory that contains the repository checkout
    #[arg(long, global = true, env = "KITCHEN_BASE_PATH")]
    base_path: Option<PathBuf>,

    /// Repository directory name under the base path
    #[arg(long, global = true)]
    repo_name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `serve` subcommand
#[derive(Parser)]
struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    port: Option<u16>,

    /// Git URL to keep the checkout in sync with
    #[arg(long)]
    repo_url: Option<String>,

    /// Hide the virtualization view
    #[arg(long)]
    no_virt: bool,

    /// Enable a plugin (can be given multiple times)
    #[arg(long = "plugin", value_name = "NAME")]
    plugins: Vec<String>,
}

/// Arguments for the `nodes` subcommand
#[derive(Parser)]
struct NodesArgs {
    /// Only nodes of this environment
    #[arg(long)]
    env: Option<String>,

    /// Comma-separated role groups
    #[arg(long)]
    roles: Option<String>,

    /// Comma-separated virtualization roles (host, guest)
    #[arg(long)]
    virt: Option<String>,

    /// Comma-separated tags
    #[arg(long)]
    tags: Option<String>,

    /// Print merged data bag records instead of node files
    #[arg(long)]
    extended: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    output: OutputFormat,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the web dashboard and JSON API
    Serve(ServeArgs),

    /// List nodes, optionally filtered
    Nodes(NodesArgs),

    /// List roles
    Roles {
        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        output: OutputFormat,

        /// Output file path (stdout if not specified)
        #[arg(short = 'O', long)]
        output_file: Option<PathBuf>,
    },

    /// Print the DOT node map of an environment
    Graph {
        /// Environment to graph
        #[arg(long)]
        env: String,

        /// Comma-separated role groups
        #[arg(long)]
        roles: Option<String>,

        /// Output file path (stdout if not specified)
        #[arg(short = 'O', long)]
        output_file: Option<PathBuf>,
    },

    /// Clone or pull the repository and rebuild the node data bag
    Sync {
        /// Git URL of the repository
        #[arg(long)]
        repo_url: Option<String>,
    },

    /// Rebuild the node data bag of the local kitchen
    BuildDataBag,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .kitchen.yaml in the current directory
    Init,
}

/// Configuration file layered with the global options.
fn load_config(cli: &Cli, overrides: AppConfig) -> AppConfig {
    let mut overrides = overrides;
    if let Some(base_path) = &cli.base_path {
        overrides.repo.base_path.clone_from(base_path);
    }
    if let Some(name) = &cli.repo_name {
        overrides.repo.name.clone_from(name);
    }

    let (config, loaded_from) =
        AppConfig::from_file_with_overrides(cli.config.as_deref(), &overrides);
    if let Some(path) = loaded_from {
        tracing::debug!("Loaded config from {}", path.display());
    }
    for error in config.validate() {
        tracing::warn!("{}", error);
    }
    config
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match &cli.command {
        Commands::Serve(args) => {
            let mut overrides = AppConfig::builder()
                .repo_url(args.repo_url.clone())
                .show_virt_view(!args.no_virt)
                .plugins(args.plugins.clone())
                .build();
            if let Some(host) = &args.host {
                overrides.server.host.clone_from(host);
            }
            if let Some(port) = args.port {
                overrides.server.port = port;
            }
            let config = load_config(&cli, overrides);

            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            runtime.block_on(kitchen::server::run(config))
        }

        Commands::Nodes(args) => {
            let config = load_config(&cli, AppConfig::default());
            let query = NodeQuery {
                env: args.env.clone(),
                roles: args.roles.clone(),
                virt: args.virt.clone(),
                tags: args.tags.clone(),
                extended: args.extended,
            };
            let target = OutputTarget::from_option(args.output_file.clone());
            cli::run_nodes(&config, &query, args.output, &target, cli.quiet)
        }

        Commands::Roles {
            output,
            output_file,
        } => {
            let config = load_config(&cli, AppConfig::default());
            let target = OutputTarget::from_option(output_file.clone());
            cli::run_roles(&config, *output, &target, cli.quiet)
        }

        Commands::Graph {
            env,
            roles,
            output_file,
        } => {
            let config = load_config(&cli, AppConfig::default());
            let target = OutputTarget::from_option(output_file.clone());
            cli::run_graph(&config, env, roles.as_deref(), &target, cli.quiet)
        }

        Commands::Sync { repo_url } => {
            let overrides = AppConfig::builder().repo_url(repo_url.clone()).build();
            let config = load_config(&cli, overrides);
            cli::run_sync(&config, cli.quiet)
        }

        Commands::BuildDataBag => {
            let config = load_config(&cli, AppConfig::default());
            cli::run_build_data_bag(&config, cli.quiet)
        }

        Commands::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "kitchen", &mut io::stdout());
            Ok(())
        }

        Commands::ConfigSchema { output } => {
            let schema = kitchen::config::generate_json_schema();
            match output {
                Some(path) => {
                    std::fs::write(path, &schema)?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(())
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let (config, loaded_from) = kitchen::config::load_or_default(cli.config.as_deref());
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(())
            }
            ConfigAction::Path => {
                let search_paths: [Option<String>; 3] = [
                    std::env::current_dir()
                        .ok()
                        .map(|p| p.display().to_string()),
                    dirs::config_dir().map(|p| p.join("kitchen").display().to_string()),
                    dirs::home_dir().map(|p| p.display().to_string()),
                ];
                eprintln!("Config file search paths (in order):");
                for path in search_paths.into_iter().flatten() {
                    eprintln!("  {path}");
                }
                eprintln!();
                eprintln!("Recognized file names:");
                for name in CONFIG_FILE_NAMES {
                    eprintln!("  {name}");
                }
                eprintln!();
                match kitchen::config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(())
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".kitchen.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                let content = kitchen::config::generate_full_example_config();
                std::fs::write(&target, content)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(())
            }
        },
    }
}
