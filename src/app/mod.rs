//! Wiring: builds the engine from configuration.

use crate::adapters::HttpDocumentSource;
use crate::config::AppConfig;
use crate::core::engine::DeedEngine;
use crate::core::extractor::{CoordinateExtractor, MarkerLocator};
use crate::core::pipeline::BoundaryPipeline;
use crate::core::projection::ProjectionPipeline;
use crate::core::DocumentSource;
use crate::utils::error::Result;
use crate::utils::validation::Validate;

pub type HttpEngine = DeedEngine<BoundaryPipeline<HttpDocumentSource>>;

pub fn build_pipeline<S: DocumentSource>(config: &AppConfig, source: S) -> Result<BoundaryPipeline<S>> {
    config.validate()?;

    let mut extractor = CoordinateExtractor::new(MarkerLocator::new(&config.extract.table_marker));
    if let Some(pattern) = &config.source.pdf_link_pattern {
        extractor = extractor.with_pdf_link_pattern(pattern)?;
    }

    let projection = ProjectionPipeline::new(&config.reference_points()?, config.zone()?)?;

    let zone = projection.zone();
    tracing::debug!(
        "Pipeline ready: zone {}{}, {} reference points, marker '{}'",
        zone.number(),
        if zone.is_northern() { "N" } else { "S" },
        config.calibration.reference_points.len(),
        config.extract.table_marker
    );

    Ok(BoundaryPipeline::new(source, extractor, projection))
}

pub fn build_engine(config: &AppConfig) -> Result<HttpEngine> {
    let source = HttpDocumentSource::new(&config.source.base_url, config.timeout())?;
    Ok(DeedEngine::new(build_pipeline(config, source)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_engine_from_defaults() {
        assert!(build_engine(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_build_engine_rejects_colinear_reference_points() {
        let config = AppConfig::from_toml_str(
            r#"
[[calibration.reference_points]]
position = [0.0, 0.0]
correction = [1.0, 1.0]

[[calibration.reference_points]]
position = [1.0, 1.0]
correction = [1.0, 1.0]

[[calibration.reference_points]]
position = [2.0, 2.0]
correction = [1.0, 1.0]
"#,
        )
        .unwrap();

        assert!(build_engine(&config).is_err());
    }
}
