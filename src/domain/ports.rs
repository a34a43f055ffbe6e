use crate::domain::model::{BoundaryPlot, ExtractedDeed, PlotReport};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where certificate pages come from.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Builds the page URL for a title deed number.
    fn certificate_url(&self, title_deed: &str) -> Result<String>;

    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Decides which table on the page holds the coordinates, one row of cell texts at a time.
pub trait TableLocator: Send + Sync {
    fn matches(&self, cells: &[String]) -> bool;
}

impl<F> TableLocator for F
where
    F: Fn(&[String]) -> bool + Send + Sync,
{
    fn matches(&self, cells: &[String]) -> bool {
        self(cells)
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self, title_deed: &str) -> Result<ExtractedDeed>;
    async fn transform(&self, deed: ExtractedDeed) -> Result<BoundaryPlot>;
    async fn report(&self, plot: BoundaryPlot) -> Result<PlotReport>;
}
