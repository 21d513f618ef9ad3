mod cli;

use agroinsights::logic::rules::RecommendationEngine;
use agroinsights::report::ReportFormat;
use agroinsights::{AgroError, Config, Database, InsightsService};
use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use serde::Serialize;
use std::path::PathBuf;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    // RUST_LOG wins over -v
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init => init()?,
        Commands::Insights => {
            let (config, db, _) = open(&cli)?;
            let service = InsightsService::new(&config, db);
            print_json(&service.general_insights()?)?;
        }
        Commands::Parcela { ref id } => {
            let (config, db, _) = open(&cli)?;
            let service = InsightsService::new(&config, db);
            print_json(&service.parcela_insights(id)?)?;
        }
        Commands::Export {
            ref ids,
            format,
            ref out,
        } => {
            let (config, db, _) = open(&cli)?;
            let format = format
                .map(ReportFormat::from)
                .unwrap_or(config.export.default_format);
            let out_dir = out
                .clone()
                .or_else(|| config.export.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));
            let service = InsightsService::new(&config, db);
            export_all(service, ids.clone(), format, out_dir).await?;
        }
        Commands::Import { ref file } => {
            let (_, db, _) = open(&cli)?;
            let bundle = agroinsights::datasources::ImportBundle::load(file)
                .with_context(|| format!("reading bundle {}", file.display()))?;
            let summary = bundle.import_into(&db)?;
            println!(
                "Imported {} parcelas and {} lecturas ({} duplicates skipped)",
                summary.parcelas, summary.lecturas, summary.duplicadas
            );
        }
        Commands::Check => {
            let (config, db, db_path) = open(&cli)?;
            check(&config, &db, &db_path)?;
        }
    }

    Ok(())
}

fn open(cli: &Cli) -> anyhow::Result<(Config, Database, PathBuf)> {
    let config = Config::load(cli.config.clone()).context("loading configuration")?;
    let db_path = Config::db_path(cli.data_dir.as_ref())?;
    let db = Database::open(&db_path)
        .with_context(|| format!("opening reading store at {}", db_path.display()))?;
    Ok((config, db, db_path))
}

fn init() -> anyhow::Result<()> {
    let (config, path) = Config::setup_interactive()?;
    tracing::info!(path = %path.display(), "Configuration written");
    println!(
        "Profiles for: {}",
        config
            .crop_profiles
            .crops()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

/// One task per parcela. Slots are claimed up front, so an id given twice is
/// rejected as already running. Every parcela is attempted; the command fails
/// if any did.
async fn export_all(
    service: InsightsService,
    ids: Vec<String>,
    format: ReportFormat,
    out_dir: PathBuf,
) -> anyhow::Result<()> {
    let mut failures = 0;
    let mut tasks = JoinSet::new();
    for id in ids {
        let slot = match service.claim_export(&id) {
            Ok(slot) => slot,
            Err(e) => {
                failures += 1;
                report_failure(&id, e);
                continue;
            }
        };
        let service = service.clone();
        let out_dir = out_dir.clone();
        tasks.spawn(async move {
            let result = service.export_claimed(slot, format, &out_dir).await;
            (id, result)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(path))) => println!("{}", path.display()),
            Ok((id, Err(e))) => {
                failures += 1;
                report_failure(&id, e);
            }
            Err(e) => {
                failures += 1;
                eprintln!("export task failed: {}", e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} export(s) failed", failures);
    }
    Ok(())
}

fn report_failure(id: &str, error: AgroError) {
    match error {
        AgroError::ExportInProgress(_) => eprintln!("{}: export already running", id),
        other => eprintln!("{}: {}", id, other),
    }
}

fn check(config: &Config, db: &Database, db_path: &std::path::Path) -> anyhow::Result<()> {
    config.validate()?;
    println!("Config: OK");
    println!(
        "  windows: insights {}d, export {}d, trend {}d",
        config.analysis.insight_window_days,
        config.analysis.export_window_days,
        config.analysis.trend_recent_days
    );
    println!(
        "  crop profiles: {} (default {})",
        config
            .crop_profiles
            .crops()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        config.crop_profiles.default_crop
    );
    println!(
        "  recommendation rules: {}",
        RecommendationEngine::new()
            .list_rules()
            .iter()
            .map(|(id, _)| *id)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let parcelas = db.list_parcelas()?;
    let lecturas = db.count_readings()?;
    println!("Store: OK ({})", db_path.display());
    println!("  {} parcelas, {} lecturas", parcelas.len(), lecturas);

    let unprofiled: Vec<_> = parcelas
        .iter()
        .filter(|p| config.crop_profiles.get(&p.tipo_cultivo).is_none())
        .map(|p| format!("{} ({})", p.parcela_id, p.tipo_cultivo))
        .collect();
    if !unprofiled.is_empty() {
        println!(
            "  using default profile for: {}",
            unprofiled.join(", ")
        );
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
