use crate::config::toml_config::AppConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "deed-plot")]
#[command(about = "Plot a title deed boundary from the land registry certificate")]
pub struct CliConfig {
    /// Title deed number to look up
    #[arg(value_parser = parse_title_deed)]
    pub title_deed: String,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the registry base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override the request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Write the boundary coordinates to a CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Write the rendered map page to an HTML file
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// 去除前後空白，拒絕空白的權狀號碼
fn parse_title_deed(value: &str) -> std::result::Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("title deed number must not be blank".to_string());
    }
    Ok(trimmed.to_string())
}

impl CliConfig {
    /// 載入設定檔並套用命令列覆蓋
    pub fn app_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;

        if let Some(base_url) = &self.base_url {
            config.source.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.source.timeout_seconds = timeout;
        }

        Ok(config)
    }
}
