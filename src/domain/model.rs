use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A projected grid position in the survey's units (metres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawCoordinate {
    pub easting: f64,
    pub northing: f64,
}

impl RawCoordinate {
    pub fn new(easting: f64, northing: f64) -> Self {
        Self { easting, northing }
    }

    pub fn offset(&self, correction: Correction) -> Self {
        Self {
            easting: self.easting + correction.d_easting,
            northing: self.northing + correction.d_northing,
        }
    }
}

/// Additive grid correction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Correction {
    pub d_easting: f64,
    pub d_northing: f64,
}

impl Correction {
    pub fn new(d_easting: f64, d_northing: f64) -> Self {
        Self {
            d_easting,
            d_northing,
        }
    }
}

/// A surveyed position with its known correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub position: RawCoordinate,
    pub correction: Correction,
}

impl ReferencePoint {
    pub fn new(easting: f64, northing: f64, d_easting: f64, d_northing: f64) -> Self {
        Self {
            position: RawCoordinate::new(easting, northing),
            correction: Correction::new(d_easting, d_northing),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeographicCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Closed polygon: the first and last points are identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryRing {
    points: Vec<GeographicCoordinate>,
}

impl BoundaryRing {
    /// Closes `vertices` by repeating the first vertex. Returns `None` when empty.
    pub fn close(mut vertices: Vec<GeographicCoordinate>) -> Option<Self> {
        let first = *vertices.first()?;
        vertices.push(first);
        Some(Self { points: vertices })
    }

    /// All points including the closing duplicate.
    pub fn points(&self) -> &[GeographicCoordinate] {
        &self.points
    }

    /// The distinct vertices, without the closing duplicate.
    pub fn vertices(&self) -> &[GeographicCoordinate] {
        &self.points[..self.points.len() - 1]
    }

    /// Arithmetic mean over every point of the closed ring.
    pub fn center(&self) -> GeographicCoordinate {
        let n = self.points.len() as f64;
        let (lat, lon) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(lat, lon), p| (lat + p.latitude, lon + p.longitude));
        GeographicCoordinate::new(lat / n, lon / n)
    }
}

/// Coordinates lifted from a certificate page, with where they came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedDeed {
    pub title_deed: String,
    pub points: Vec<RawCoordinate>,
    pub source_url: String,
    pub pdf_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryPlot {
    pub title_deed: String,
    pub source_url: String,
    pub pdf_link: Option<String>,
    pub raw_point_count: usize,
    pub applied_correction: Correction,
    pub ring: BoundaryRing,
    pub center: GeographicCoordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotReport {
    pub title_deed: String,
    pub status: String,
    pub source_url: String,
    pub pdf_link: Option<String>,
    pub raw_point_count: usize,
    pub applied_correction: Correction,
    pub ring: BoundaryRing,
    pub center: GeographicCoordinate,
    pub generated_at: DateTime<Utc>,
}
