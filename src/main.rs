use anyhow::Context;
use clap::Parser;
use deed_plot::adapters::render::{format_coordinate, map_service_link, render_page, write_coordinates_csv};
use deed_plot::utils::{error::ErrorSeverity, logger, validation::Validate};
use deed_plot::{build_engine, CliConfig, PlotOutcome};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting deed-plot CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = cli.app_config().context("failed to load configuration")?;

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let engine = build_engine(&config).context("failed to build the boundary pipeline")?;

    let outcome = match engine.resolve(&cli.title_deed).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(
                "❌ Lookup failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            let exit_code = match e.severity() {
                ErrorSeverity::Low | ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    };

    if let Some(path) = &cli.html {
        std::fs::write(path, render_page(&cli.title_deed, Some(&outcome)))
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("📁 Map page saved to: {}", path.display());
    }

    let report = match &outcome {
        PlotOutcome::Plotted(report) => report,
        PlotOutcome::Failed { reason, error, .. } => {
            tracing::debug!("Underlying error: {}", error);
            eprintln!("❌ {}", reason.message());
            eprintln!("💡 建議: {}", error.recovery_suggestion());
            std::process::exit(2);
        }
    };

    if let Some(path) = &cli.csv {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        write_coordinates_csv(file, &report.ring)?;
        tracing::info!("📁 Coordinates saved to: {}", path.display());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("✅ {}", report.status);
    println!("{:>3}  {:>14}  {:>14}", "#", "Latitude", "Longitude");
    for (i, p) in report.ring.vertices().iter().enumerate() {
        println!(
            "{:>3}  {:>14}  {:>14}",
            i + 1,
            format_coordinate(p.latitude),
            format_coordinate(p.longitude)
        );
    }
    println!();
    println!("🗺️  {}", map_service_link(report.center));
    println!("📄 {}", report.source_url);
    if let Some(link) = &report.pdf_link {
        println!("📎 {}", link);
    }

    Ok(())
}
