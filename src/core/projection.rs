use crate::core::calibration::CorrectionField;
use crate::domain::model::{
    BoundaryRing, Correction, GeographicCoordinate, RawCoordinate, ReferencePoint,
};
use crate::utils::error::{PlotError, Result};
use proj4rs::Proj;

const GEOGRAPHIC_PROJ: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// A fixed UTM zone on WGS84.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionZone {
    number: u8,
    northern: bool,
}

impl ProjectionZone {
    pub fn new(number: u8, northern: bool) -> Result<Self> {
        if !(1..=60).contains(&number) {
            return Err(PlotError::projection(format!(
                "UTM zone must be between 1 and 60, got {}",
                number
            )));
        }
        Ok(Self { number, northern })
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn is_northern(&self) -> bool {
        self.northern
    }

    pub fn proj_string(&self) -> String {
        let hemisphere = if self.northern { "" } else { " +south" };
        format!(
            "+proj=utm +zone={}{} +datum=WGS84 +units=m +no_defs",
            self.number, hemisphere
        )
    }
}

/// Result of running a batch of raw coordinates through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedBoundary {
    pub correction: Correction,
    pub ring: BoundaryRing,
    pub center: GeographicCoordinate,
}

pub struct ProjectionPipeline {
    field: CorrectionField,
    zone: ProjectionZone,
}

impl ProjectionPipeline {
    pub fn new(reference_points: &[ReferencePoint], zone: ProjectionZone) -> Result<Self> {
        let field = CorrectionField::build(reference_points)?;
        Ok(Self { field, zone })
    }

    pub fn zone(&self) -> ProjectionZone {
        self.zone
    }

    /// Adds the batch correction to every point. `None` for an empty batch.
    pub fn calibrate(&self, raw: &[RawCoordinate]) -> Option<(Correction, Vec<RawCoordinate>)> {
        let correction = self.field.batch_correction(raw)?;
        let calibrated = raw.iter().map(|p| p.offset(correction)).collect();
        Some((correction, calibrated))
    }

    /// Calibrates, projects to latitude/longitude and closes the ring.
    /// Returns `Ok(None)` when `raw` is empty.
    pub fn convert(&self, raw: &[RawCoordinate]) -> Result<Option<ProjectedBoundary>> {
        let Some((correction, calibrated)) = self.calibrate(raw) else {
            return Ok(None);
        };

        tracing::debug!(
            "📐 Batch correction: ΔE={:.4}, ΔN={:.4}",
            correction.d_easting,
            correction.d_northing
        );

        let (grid, geographic) = self.projections()?;
        let vertices = calibrated
            .iter()
            .map(|p| grid_to_geographic(&grid, &geographic, *p))
            .collect::<Result<Vec<_>>>()?;

        let ring = BoundaryRing::close(vertices)
            .ok_or_else(|| PlotError::projection("no vertices to close"))?;
        let center = ring.center();

        Ok(Some(ProjectedBoundary {
            correction,
            ring,
            center,
        }))
    }

    pub fn to_geographic(&self, point: RawCoordinate) -> Result<GeographicCoordinate> {
        let (grid, geographic) = self.projections()?;
        grid_to_geographic(&grid, &geographic, point)
    }

    /// Forward transform, the inverse of [`Self::to_geographic`].
    pub fn to_grid(&self, point: GeographicCoordinate) -> Result<RawCoordinate> {
        let (grid, geographic) = self.projections()?;
        let mut xyz = (point.longitude.to_radians(), point.latitude.to_radians(), 0.0);
        proj4rs::transform::transform(&geographic, &grid, &mut xyz)
            .map_err(|e| PlotError::projection(format!("forward transform failed: {:?}", e)))?;
        Ok(RawCoordinate::new(xyz.0, xyz.1))
    }

    fn projections(&self) -> Result<(Proj, Proj)> {
        let grid = Proj::from_proj_string(&self.zone.proj_string())
            .map_err(|e| PlotError::projection(format!("invalid zone definition: {:?}", e)))?;
        let geographic = Proj::from_proj_string(GEOGRAPHIC_PROJ)
            .map_err(|e| PlotError::projection(format!("invalid geographic definition: {:?}", e)))?;
        Ok((grid, geographic))
    }
}

fn grid_to_geographic(grid: &Proj, geographic: &Proj, point: RawCoordinate) -> Result<GeographicCoordinate> {
    let mut xyz = (point.easting, point.northing, 0.0);
    proj4rs::transform::transform(grid, geographic, &mut xyz).map_err(|e| {
        PlotError::projection(format!(
            "inverse transform failed for ({}, {}): {:?}",
            point.easting, point.northing, e
        ))
    })?;

    let (lon, lat) = (xyz.0.to_degrees(), xyz.1.to_degrees());
    if !lat.is_finite() || !lon.is_finite() {
        return Err(PlotError::projection(format!(
            "non-finite result for ({}, {})",
            point.easting, point.northing
        )));
    }
    Ok(GeographicCoordinate::new(lat, lon))
}
