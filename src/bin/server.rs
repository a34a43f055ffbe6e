use anyhow::Context;
use clap::Parser;
use deed_plot::api::create_router;
use deed_plot::utils::{logger, validation::Validate};
use deed_plot::{build_engine, AppConfig};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "deed-plot-server")]
#[command(about = "Web form for plotting title deed boundaries")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address from config
    #[arg(long)]
    bind: Option<String>,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    logger::init_server_logger(args.json_logs || config.server.json_logs);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let engine = Arc::new(build_engine(&config).context("failed to build the boundary pipeline")?);
    let app = create_router(engine);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;

    tracing::info!("🚀 Title deed boundary server");
    tracing::info!("📡 Listening on http://{}", config.server.bind);
    tracing::info!("  GET  /                          lookup form");
    tracing::info!("  POST /                          form submission (title_deed)");
    tracing::info!("  GET  /api/boundary?title_deed=  JSON report");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
