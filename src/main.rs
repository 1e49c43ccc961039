//! Maintenance Registry CLI
//!
//! Operator tool over a YAML catalog: resolve sector configurations, list
//! child options, walk the cascade and check access decisions.
//!
//! # Usage
//!
//! ```bash
//! # Resolve a sector configuration (any casing / accentuation)
//! maint-registry resolve "LABORATORIO DE ENSAIOS ELETRICOS"
//!
//! # List machine types of sector 10
//! maint-registry children --level machine_type --parent 10
//!
//! # Walk the cascade by name, one name per level
//! maint-registry walk "Produção" "Bobinagem" "Motor de indução"
//!
//! # Check an access decision
//! maint-registry access --role SUPERVISOR --feature desenvolvimento --sector Bobinagem
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use maint_registry::{
    normalize, DataSource, EntityRef, HierarchyLevel, InMemoryDataSource, LoadOutcome, Principal, RegistryCore,
    RegistrySettings, Role,
};

#[derive(Parser)]
#[command(name = "maint-registry")]
#[command(version = "0.1.0")]
#[command(about = "Sector configuration and hierarchy cascade CLI for the maintenance registry")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Catalog file (overrides catalog_path from settings)
    #[arg(long, global = true, env = "MAINT_REGISTRY_CATALOG")]
    catalog: Option<String>,

    /// Output format: json or pretty (default)
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one or more sector identifiers (id or name)
    Resolve {
        #[arg(required = true)]
        sectors: Vec<String>,
    },

    /// List entities at a level under a parent
    Children {
        /// Level: department, sector, machine_type, test_type, activity, failure_type, rework_cause
        #[arg(short, long)]
        level: String,

        /// Parent id (omit for departments)
        #[arg(short, long)]
        parent: Option<i64>,
    },

    /// Select entities by name from the department down and print the cascade
    Walk {
        /// One name per level, shallowest first
        names: Vec<String>,
    },

    /// Evaluate an access decision
    Access {
        /// Role: ADMIN, GESTAO, PCP, SUPERVISOR, USER
        #[arg(short, long)]
        role: String,

        /// Module name, e.g. pcp, gestao, dashboard, desenvolvimento
        #[arg(short, long)]
        feature: String,

        /// User's sector name
        #[arg(short, long)]
        sector: Option<String>,

        /// Explicit "works in production" flag
        #[arg(long)]
        production_flag: Option<bool>,
    },
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = match RegistrySettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli.command, cli.catalog, cli.format, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
            } else {
                eprintln!("{}: {:#}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(
    command: Commands,
    catalog: Option<String>,
    format: OutputFormat,
    settings: &RegistrySettings,
) -> anyhow::Result<()> {
    let catalog_path = catalog.unwrap_or_else(|| settings.catalog_path.clone());
    tracing::info!(path = %catalog_path, "Loading catalog");

    let source = InMemoryDataSource::from_file(&catalog_path)
        .with_context(|| format!("loading catalog {}", catalog_path))?;
    tracing::info!(entities = source.catalog().entities.len(), "Catalog loaded");

    let core = RegistryCore::new(Arc::new(source), settings);

    if !settings.cache.warm_sectors.is_empty() {
        let warmed = core.warm(&settings.cache.warm_sectors).await;
        tracing::info!(warmed, "Cache warmed");
    }

    match command {
        Commands::Resolve { sectors } => cmd_resolve(&core, &sectors, format).await,
        Commands::Children { level, parent } => cmd_children(&core, &level, parent, format).await,
        Commands::Walk { names } => cmd_walk(&core, &names, format).await,
        Commands::Access {
            role,
            feature,
            sector,
            production_flag,
        } => cmd_access(&core, &role, &feature, sector, production_flag, format),
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

async fn cmd_resolve(
    core: &RegistryCore,
    sectors: &[String],
    format: OutputFormat,
) -> anyhow::Result<()> {
    for identifier in sectors {
        let config = core.resolve(identifier).await?;

        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config.as_ref())?),
            OutputFormat::Pretty => {
                println!(
                    "{} {} ({})",
                    "Sector".green().bold(),
                    config.display_name,
                    config.sector_key
                );
                println!("  fields:      {}", config.field_schema.len());
                println!(
                    "  tests:       {}",
                    config
                        .test_dictionary
                        .keys()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                println!("  activities:  {}", config.activity_list.join(", "));
                println!("  apontamento: {}", config.backend_endpoints.apontamento);
                println!("  ordens:      {}", config.backend_endpoints.ordem_servico);
            }
        }
    }

    let stats = core.resolver().cache().stats();
    tracing::debug!(hits = stats.hits, misses = stats.misses, stores = stats.stores, "Cache stats");
    Ok(())
}

async fn cmd_children(
    core: &RegistryCore,
    level: &str,
    parent: Option<i64>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let level: HierarchyLevel = level.parse()?;
    if level.parent().is_some() && parent.is_none() {
        return Err(anyhow!("--parent is required for level {}", level));
    }

    let options = core.source().list_entities(level, parent).await?;
    print_entities(level, &options, format)
}

async fn cmd_walk(core: &RegistryCore, names: &[String], format: OutputFormat) -> anyhow::Result<()> {
    let cascade = core.cascade();
    if let LoadOutcome::Failed { error, .. } = cascade.load_root().await {
        return Err(error.into());
    }

    for (level, name) in HierarchyLevel::ALL.into_iter().zip(names) {
        let wanted = normalize(name);
        let entity = cascade
            .options_for(level)
            .into_iter()
            .find(|e| wanted.matches(&e.name))
            .ok_or_else(|| anyhow!("no {} named '{}' under the current selection", level, name))?;

        match cascade.set_selection(level, entity).await? {
            LoadOutcome::Failed { level, error } => {
                return Err(anyhow!("loading {} options failed: {}", level, error));
            }
            outcome => tracing::debug!(?outcome, "Selection applied"),
        }
    }

    let snapshot = cascade.snapshot();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        OutputFormat::Pretty => {
            for level in &snapshot.levels {
                let selected = level
                    .selected
                    .as_ref()
                    .map(|e| e.name.clone())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<14} {:<32} {} option(s) [{:?}]",
                    level.level.to_string().bold(),
                    selected,
                    level.options.len(),
                    level.status
                );
            }
        }
    }

    Ok(())
}

fn cmd_access(
    core: &RegistryCore,
    role: &str,
    feature: &str,
    sector: Option<String>,
    production_flag: Option<bool>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let role: Role = role.parse()?;
    let principal = Principal {
        role,
        sector: sector.clone(),
        production_flag,
    };

    let allowed = core.policy().can_access(&principal, feature);
    let in_production = core.works_in_production(
        role,
        sector.as_deref().unwrap_or_default(),
        production_flag,
    );

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "role": role,
                "feature": feature,
                "allowed": allowed,
                "works_in_production": in_production,
            })
        ),
        OutputFormat::Pretty => {
            let verdict = if allowed {
                "ALLOW".green().bold()
            } else {
                "DENY".red().bold()
            };
            println!("{} {} -> {}", verdict, role, feature);
            println!("  works in production: {}", in_production);
        }
    }

    Ok(())
}

fn print_entities(
    level: HierarchyLevel,
    entities: &[EntityRef],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(entities)?),
        OutputFormat::Pretty => {
            println!("{} {} option(s)", level.to_string().bold(), entities.len());
            for entity in entities {
                println!("  [{}] {}", entity.id, entity.name);
            }
        }
    }
    Ok(())
}
