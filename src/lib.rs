pub mod adapters;
#[cfg(feature = "server")]
pub mod api;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::AppConfig;

pub use adapters::HttpDocumentSource;
pub use app::{build_engine, build_pipeline, HttpEngine};
pub use core::{
    calibration::CorrectionField,
    engine::{DeedEngine, PlotOutcome},
    extractor::{CoordinateExtractor, MarkerLocator},
    pipeline::BoundaryPipeline,
    projection::{ProjectionPipeline, ProjectionZone},
};
pub use domain::model::{
    BoundaryRing, Correction, GeographicCoordinate, PlotReport, RawCoordinate, ReferencePoint,
};
pub use utils::error::{FailureReason, PlotError, Result};
