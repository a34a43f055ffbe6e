use crate::core::calibration::MIN_REFERENCE_POINTS;
use crate::core::extractor::{DEFAULT_PDF_LINK_PATTERN, DEFAULT_TABLE_MARKER};
use crate::core::projection::ProjectionZone;
use crate::domain::model::ReferencePoint;
use crate::utils::error::{PlotError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.addisland.gov.et/en-us";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_ZONE: u8 = 37;
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub extract: ExtractConfig,
    pub projection: ProjectionConfig,
    pub calibration: CalibrationConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub pdf_link_pattern: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            pdf_link_pattern: Some(DEFAULT_PDF_LINK_PATTERN.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub table_marker: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            table_marker: DEFAULT_TABLE_MARKER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub zone: u8,
    pub northern: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            zone: DEFAULT_ZONE,
            northern: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub reference_points: Vec<ReferencePointConfig>,
}

/// One surveyed point as written in the config file.
/// Kept as plain lists so a wrong dimensionality is reported, not silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferencePointConfig {
    pub position: Vec<f64>,
    pub correction: Vec<f64>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        let reference_points = [
            ([477504.6975, 980922.813], [90.6484, 204.2779]),
            ([482977.07875, 992734.94275], [92.6484, 210.2779]),
            ([487741.8536, 993586.1784], [94.6484, 208.2779]),
        ]
        .into_iter()
        .map(|(position, correction)| ReferencePointConfig {
            position: position.to_vec(),
            correction: correction.to_vec(),
        })
        .collect();

        Self { reference_points }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            json_logs: false,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| PlotError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 有指定檔案就載入，否則使用預設值
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// 替換環境變數 (例如 ${REGISTRY_URL})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_RE: OnceLock<Regex> = OnceLock::new();
        let re = ENV_RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static env regex"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds)
    }

    pub fn zone(&self) -> Result<ProjectionZone> {
        ProjectionZone::new(self.projection.zone, self.projection.northern)
    }

    /// Reference points with their dimensionality checked.
    pub fn reference_points(&self) -> Result<Vec<ReferencePoint>> {
        self.calibration
            .reference_points
            .iter()
            .enumerate()
            .map(|(i, rp)| {
                let (e, n) = validation::validate_pair(
                    &format!("calibration.reference_points[{}].position", i),
                    &rp.position,
                )?;
                let (de, dn) = validation::validate_pair(
                    &format!("calibration.reference_points[{}].correction", i),
                    &rp.correction,
                )?;
                Ok(ReferencePoint::new(e, n, de, dn))
            })
            .collect()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("source.base_url", &self.source.base_url)?;
        validation::validate_positive_number("source.timeout_seconds", self.source.timeout_seconds, 1)?;
        if let Some(pattern) = &self.source.pdf_link_pattern {
            validation::validate_regex("source.pdf_link_pattern", pattern)?;
        }

        validation::validate_non_empty_string("extract.table_marker", &self.extract.table_marker)?;
        validation::validate_range("projection.zone", self.projection.zone, 1, 60)?;

        let points = self.reference_points()?;
        if points.len() < MIN_REFERENCE_POINTS {
            return Err(PlotError::InvalidConfigValueError {
                field: "calibration.reference_points".to_string(),
                value: points.len().to_string(),
                reason: format!("At least {} reference points are required", MIN_REFERENCE_POINTS),
            });
        }

        validation::validate_non_empty_string("server.bind", &self.server.bind)?;
        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
