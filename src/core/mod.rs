pub mod calibration;
pub mod engine;
pub mod extractor;
pub mod html;
pub mod pipeline;
pub mod projection;

pub use crate::domain::model::{BoundaryPlot, ExtractedDeed, PlotReport};
pub use crate::domain::ports::{DocumentSource, Pipeline, TableLocator};
pub use crate::utils::error::Result;
