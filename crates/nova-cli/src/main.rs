//! Nova - configuration and marketplace manager
//!
//! Usage:
//!   nova marketplace add <source> [--scope global|project]
//!   nova marketplace remove <name-or-source> [--scope global|project]
//!   nova marketplace list
//!   nova marketplace show <name>
//!   nova config show [--format yaml|json]

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};

use nova_core::config::{ConfigError, ConfigStore};
use nova_core::marketplace::{
    ManifestErrorKind, Marketplace, MarketplaceError, MarketplaceInfo,
};
use nova_core::settings::Settings;
use nova_core::types::MarketplaceScope;

#[derive(Parser)]
#[command(name = "nova")]
#[command(about = "Nova command-line interface", long_about = None, version)]
struct Cli {
    /// Override working directory used when resolving project config
    #[arg(long, global = true, hide = true)]
    working_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage marketplace sources
    Marketplace(MarketplaceArgs),

    /// Inspect configuration
    Config(ConfigArgs),
}

#[derive(Args)]
struct MarketplaceArgs {
    #[command(subcommand)]
    command: MarketplaceSubcommand,
}

#[derive(Subcommand)]
enum MarketplaceSubcommand {
    /// Add a marketplace source
    ///
    /// Sources may be GitHub shorthand (owner/repo), a git URL or a local
    /// directory.
    Add {
        /// Marketplace source (owner/repo, git URL, or local path)
        source: String,

        /// Configuration scope: global (~/.config/nova) or project (.nova/)
        #[arg(long, short, value_enum, ignore_case = true, default_value = "global")]
        scope: ScopeArg,
    },

    /// Remove a marketplace by name or source
    #[command(alias = "rm")]
    Remove {
        /// Marketplace name or source to remove
        name_or_source: String,

        /// Configuration scope (project, then global, when omitted)
        #[arg(long, short, value_enum, ignore_case = true)]
        scope: Option<ScopeArg>,
    },

    /// List all configured marketplaces
    List,

    /// Show details for a specific marketplace
    Show {
        /// Marketplace name
        name: String,
    },
}

#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Print the effective configuration
    Show {
        /// Output format
        #[arg(long, short, value_enum, ignore_case = true, default_value = "yaml")]
        format: ConfigFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    Global,
    Project,
}

impl From<ScopeArg> for MarketplaceScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Global => MarketplaceScope::Global,
            ScopeArg::Project => MarketplaceScope::Project,
        }
    }
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum ConfigFormat {
    #[default]
    Yaml,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let settings = Settings::from_platform()?;
    let working_dir = match cli.working_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    if let Err(err) = logging::init(&settings, &working_dir) {
        eprintln!("warning: {err:#}");
    }
    tracing::debug!(working_dir = %working_dir.display(), "starting");

    match cli.command {
        Commands::Marketplace(args) => {
            let marketplace = Marketplace::new(&settings, &working_dir);
            Ok(run_marketplace(&marketplace, args.command))
        }
        Commands::Config(args) => match args.command {
            ConfigSubcommand::Show { format } => {
                run_config_show(&ConfigStore::new(&settings, &working_dir), format)
            }
        },
    }
}

fn run_marketplace(marketplace: &Marketplace, command: MarketplaceSubcommand) -> ExitCode {
    let result = match command {
        MarketplaceSubcommand::Add { source, scope } => {
            let scope = MarketplaceScope::from(scope);
            marketplace.add(&source, scope).map(|info| {
                println!(
                    "✓ Added '{}' with {} ({})",
                    info.name,
                    bundle_text(info.bundle_count),
                    scope
                );
            })
        }
        MarketplaceSubcommand::Remove {
            name_or_source,
            scope,
        } => marketplace
            .remove(&name_or_source, scope.map(MarketplaceScope::from))
            .map(|name| println!("✓ Removed '{name}'")),
        MarketplaceSubcommand::List => marketplace.list().map(|infos| print_list(&infos)),
        MarketplaceSubcommand::Show { name } => {
            marketplace.get(&name).map(|info| print_show(&info))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_marketplace_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run_config_show(store: &ConfigStore, format: ConfigFormat) -> Result<ExitCode> {
    let config = match store.load() {
        Ok(config) => config,
        Err(err) => {
            report_config_error(&err);
            return Ok(ExitCode::FAILURE);
        }
    };

    // Round-trip through JSON so keys print sorted.
    let payload = serde_json::to_value(serde_yaml::Value::Mapping(config.to_mapping()?))?;
    match format {
        ConfigFormat::Json => println!("{}", serde_json::to_string_pretty(&payload)?),
        ConfigFormat::Yaml => print!("{}", serde_yaml::to_string(&payload)?),
    }
    Ok(ExitCode::SUCCESS)
}

fn bundle_text(count: usize) -> String {
    if count == 1 {
        "1 bundle".to_string()
    } else {
        format!("{count} bundles")
    }
}

fn print_list(infos: &[MarketplaceInfo]) {
    if infos.is_empty() {
        println!("No marketplaces configured.");
        return;
    }

    for info in infos {
        println!("• {}", info.name);
        println!("  {}", info.description);
        println!("  {} • {}", bundle_text(info.bundle_count), info.source);
    }
}

fn print_show(info: &MarketplaceInfo) {
    println!("{}", info.name);
    println!("Description: {}", info.description);
    println!("Source: {}", info.source);
    println!("Bundles: {}", bundle_text(info.bundle_count));
}

fn report_marketplace_error(err: &MarketplaceError) {
    match err {
        MarketplaceError::NotFound { name_or_source, .. } => {
            eprintln!("error: marketplace '{name_or_source}' not found");
            eprintln!("hint: use 'nova marketplace list' to see available marketplaces");
        }
        MarketplaceError::AlreadyExists { existing_name, .. } => {
            eprintln!("error: {err}");
            eprintln!("hint: use 'nova marketplace remove {existing_name}' to replace it");
        }
        MarketplaceError::SourceParse { message, .. } => {
            eprintln!("error: invalid marketplace source");
            eprintln!("  {message}");
            eprintln!("hint: valid formats are:");
            eprintln!("  - owner/repo (GitHub)");
            eprintln!("  - https://github.com/owner/repo.git (Git URL)");
            eprintln!("  - ./path/to/marketplace (local directory)");
        }
        MarketplaceError::State { name, message } => {
            eprintln!("error: marketplace '{name}' state is corrupted");
            eprintln!("  {message}");
            eprintln!("hint: remove and re-add the marketplace to rebuild its state");
        }
        MarketplaceError::InvalidManifest { kind, message, .. } => {
            eprintln!("error: {message}");
            if *kind == ManifestErrorKind::Missing {
                eprintln!("hint: ensure marketplace.json exists at the repository root");
            }
        }
        MarketplaceError::Fetch { message, .. } => {
            eprintln!("error: failed to fetch marketplace");
            eprintln!("  {message}");
            eprintln!("hint: verify the source is accessible and contains a valid marketplace");
        }
        MarketplaceError::Storage { .. } => {
            eprintln!("error: {err}");
        }
        MarketplaceError::Config(config) => report_config_error(config),
    }
}

fn report_config_error(err: &ConfigError) {
    eprintln!("error: {err}");
    if let ConfigError::Validation {
        field: Some(field), ..
    } = err
    {
        eprintln!("hint: check the '{field}' setting");
    }
}
