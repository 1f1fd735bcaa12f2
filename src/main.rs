use anyhow::Context;
use clap::Parser;
use std::time::Duration;
use tray_sizer::config::cli::OutputFormat;
use tray_sizer::config::sector_file::SectorFile;
use tray_sizer::config::toml_config::CatalogSource;
use tray_sizer::core::{CatalogRepository, Sector, SizingResults, TrayProjection};
use tray_sizer::utils::error::ErrorSeverity;
use tray_sizer::utils::{logger, validation::Validate};
use tray_sizer::{CliConfig, HttpCatalog, InMemoryCatalog, SizingError, TomlConfig, TraySizer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let mut config = TomlConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config))?;
    if let Some(path) = &cli.catalog {
        config.catalog.source = CatalogSource::Csv;
        config.catalog.path = Some(path.clone());
    }

    if config.json_logging() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting tray-sizer");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let sector = SectorFile::from_file(&cli.sector)
        .and_then(SectorFile::into_sector)
        .with_context(|| format!("failed to load sector from {}", cli.sector))?;

    let outcome = match config.catalog.source {
        CatalogSource::Csv => {
            let path = config.catalog.path.clone().unwrap_or_default();
            let catalog = InMemoryCatalog::from_csv_file(&path)
                .with_context(|| format!("failed to load catalog from {}", path))?;
            size(catalog, &config, sector).await
        }
        CatalogSource::Http => {
            let endpoint = config.catalog.endpoint.clone().unwrap_or_default();
            let timeout = Duration::from_secs(config.catalog_timeout_seconds());
            let catalog = HttpCatalog::new(endpoint, timeout)?;
            size(catalog, &config, sector).await
        }
    };

    match outcome {
        Ok((sector, results)) => {
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
                OutputFormat::Text => print_report(&sector, &results),
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Sizing failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

async fn size<C: CatalogRepository>(
    catalog: C,
    config: &TomlConfig,
    mut sector: Sector,
) -> Result<(Sector, SizingResults), SizingError> {
    let sizer = TraySizer::new(catalog, config.factors);
    let results = sizer.compute_optimal_tray(&sector).await?;
    sector.commit_results(results.clone())?;
    Ok((sector, results))
}

fn describe(tray: &TrayProjection) -> String {
    let details = &tray.technical_details;
    format!(
        "{} ({}, {}): {}mm x {}mm, {}mm sheet, {} kg/m",
        tray.id,
        tray.tray_type,
        tray.category.effective(),
        details.width_mm,
        details.height_mm,
        details.thickness_mm,
        details.load_resistance_kg_m
    )
}

fn print_report(sector: &Sector, results: &SizingResults) {
    println!("Sector: {}", sector.name());
    println!("Calculated load: {:.3} kg/m", results.calculated_load_kg_m);
    println!("Calculated cable area: {:.1} mm²", results.calculated_area_mm2);

    match &results.optimal {
        Some(optimal) => {
            println!("✅ Recommended tray: {}", describe(optimal));
            for (i, alternative) in results.alternatives.iter().enumerate() {
                println!("   Alternative {}: {}", i + 1, describe(alternative));
            }
        }
        None => println!("⚠️  No {} tray in the catalog can carry these cables", sector.tray_type()),
    }

    for warning in &results.warnings {
        println!("⚠️  {}", warning);
    }
}
