use crate::core::extractor::CoordinateExtractor;
use crate::core::projection::ProjectionPipeline;
use crate::core::{BoundaryPlot, DocumentSource, ExtractedDeed, Pipeline, PlotReport};
use crate::utils::error::{PlotError, Result};

pub const SUCCESS_STATUS: &str = "Valid title deed. Boundary coordinates retrieved and calibrated.";

pub struct BoundaryPipeline<S: DocumentSource> {
    source: S,
    extractor: CoordinateExtractor,
    projection: ProjectionPipeline,
}

impl<S: DocumentSource> BoundaryPipeline<S> {
    pub fn new(source: S, extractor: CoordinateExtractor, projection: ProjectionPipeline) -> Self {
        Self {
            source,
            extractor,
            projection,
        }
    }
}

#[async_trait::async_trait]
impl<S: DocumentSource> Pipeline for BoundaryPipeline<S> {
    async fn extract(&self, title_deed: &str) -> Result<ExtractedDeed> {
        let url = self.source.certificate_url(title_deed)?;
        tracing::info!("🔍 Checking URL: {}", url);

        let markup = self.source.fetch(&url).await?;
        tracing::info!("✅ Successfully fetched HTML ({} bytes)", markup.len());

        // 解析錯誤與「找不到座標」分開記錄
        match self.extractor.extract(title_deed, &url, &markup) {
            Ok(deed) => Ok(deed),
            Err(e @ PlotError::Parse { .. }) => {
                tracing::warn!("❌ Could not parse certificate page {}: {}", url, e);
                Err(e)
            }
            Err(e) => {
                tracing::warn!("❌ {}", e);
                Err(e)
            }
        }
    }

    async fn transform(&self, deed: ExtractedDeed) -> Result<BoundaryPlot> {
        // 座標本身無法投影時視為沒有有效座標
        let boundary = self
            .projection
            .convert(&deed.points)
            .map_err(|e| match e {
                PlotError::Projection { message } => {
                    tracing::warn!(
                        "❌ Coordinates for {} could not be projected: {}",
                        deed.title_deed,
                        message
                    );
                    PlotError::no_coordinates(format!("coordinates could not be projected: {}", message))
                }
                other => other,
            })?
            .ok_or(PlotError::EmptyInput)?;

        tracing::info!(
            "📐 Applied calibration ΔE={:.4} ΔN={:.4} to {} points",
            boundary.correction.d_easting,
            boundary.correction.d_northing,
            deed.points.len()
        );

        Ok(BoundaryPlot {
            title_deed: deed.title_deed,
            source_url: deed.source_url,
            pdf_link: deed.pdf_link,
            raw_point_count: deed.points.len(),
            applied_correction: boundary.correction,
            ring: boundary.ring,
            center: boundary.center,
        })
    }

    async fn report(&self, plot: BoundaryPlot) -> Result<PlotReport> {
        Ok(PlotReport {
            title_deed: plot.title_deed,
            status: SUCCESS_STATUS.to_string(),
            source_url: plot.source_url,
            pdf_link: plot.pdf_link,
            raw_point_count: plot.raw_point_count,
            applied_correction: plot.applied_correction,
            ring: plot.ring,
            center: plot.center,
            generated_at: chrono::Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::projection::ProjectionZone;
    use crate::domain::model::{RawCoordinate, ReferencePoint};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FixtureSource {
        pages: HashMap<String, String>,
    }

    impl FixtureSource {
        fn with_page(deed: &str, html: &str) -> Self {
            let mut pages = HashMap::new();
            pages.insert(format!("fixture://certificate/{}", deed), html.to_string());
            Self { pages }
        }
    }

    #[async_trait]
    impl DocumentSource for FixtureSource {
        fn certificate_url(&self, title_deed: &str) -> Result<String> {
            Ok(format!("fixture://certificate/{}", title_deed))
        }

        async fn fetch(&self, url: &str) -> Result<String> {
            self.pages.get(url).cloned().ok_or_else(|| PlotError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn pipeline(source: FixtureSource) -> BoundaryPipeline<FixtureSource> {
        let refs = vec![
            ReferencePoint::new(477504.6975, 980922.813, 90.6484, 204.2779),
            ReferencePoint::new(482977.07875, 992734.94275, 92.6484, 210.2779),
            ReferencePoint::new(487741.8536, 993586.1784, 94.6484, 208.2779),
        ];
        let projection =
            ProjectionPipeline::new(&refs, ProjectionZone::new(37, true).unwrap()).unwrap();
        BoundaryPipeline::new(source, CoordinateExtractor::default(), projection)
    }

    const PAGE: &str = r#"<table>
        <tr><td><span>Cordnates/ X</span></td><td><span>Y</span></td></tr>
        <tr><td>477504.6975</td><td>980922.813</td></tr>
        <tr><td>477524.6975</td><td>980922.813</td></tr>
        <tr><td>477524.6975</td><td>980942.813</td></tr>
    </table>"#;

    #[tokio::test]
    async fn test_extract_from_fixture() {
        let pipeline = pipeline(FixtureSource::with_page("AK/1/2", PAGE));

        let deed = pipeline.extract("AK/1/2").await.unwrap();
        assert_eq!(deed.points.len(), 3);
        assert_eq!(deed.points[0], RawCoordinate::new(477504.6975, 980922.813));
        assert_eq!(deed.source_url, "fixture://certificate/AK/1/2");
    }

    #[tokio::test]
    async fn test_transform_produces_closed_ring() {
        let pipeline = pipeline(FixtureSource::with_page("7", PAGE));

        let deed = pipeline.extract("7").await.unwrap();
        let plot = pipeline.transform(deed).await.unwrap();

        assert_eq!(plot.raw_point_count, 3);
        let points = plot.ring.points();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], points[3]);
    }

    #[tokio::test]
    async fn test_transform_empty_deed_is_no_data() {
        let pipeline = pipeline(FixtureSource::with_page("7", PAGE));
        let deed = ExtractedDeed {
            title_deed: "7".to_string(),
            points: Vec::new(),
            source_url: "fixture://certificate/7".to_string(),
            pdf_link: None,
        };

        let err = pipeline.transform(deed).await.unwrap_err();
        assert!(matches!(err, PlotError::EmptyInput));
    }

    #[tokio::test]
    async fn test_unprojectable_coordinates_are_no_data() {
        let page = r#"<table>
            <tr><td>Cordnates/ X</td><td>Y</td></tr>
            <tr><td>99999999999.0</td><td>5.0</td></tr>
        </table>"#;
        let pipeline = pipeline(FixtureSource::with_page("7", page));

        let deed = pipeline.extract("7").await.unwrap();
        let err = pipeline.transform(deed).await.unwrap_err();

        assert!(matches!(err, PlotError::NoCoordinates { .. }));
        assert!(err.to_string().contains("could not be projected"));
    }

    #[tokio::test]
    async fn test_report_carries_status() {
        let pipeline = pipeline(FixtureSource::with_page("7", PAGE));
        let deed = pipeline.extract("7").await.unwrap();
        let plot = pipeline.transform(deed).await.unwrap();
        let report = pipeline.report(plot).await.unwrap();

        assert_eq!(report.status, SUCCESS_STATUS);
        assert_eq!(report.title_deed, "7");
    }
}
