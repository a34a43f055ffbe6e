use crate::core::{Pipeline, PlotReport};
use crate::utils::error::{FailureReason, PlotError, Result};
use crate::utils::validation::validate_non_empty_string;

/// What the caller shows for one lookup.
#[derive(Debug)]
pub enum PlotOutcome {
    Plotted(Box<PlotReport>),
    Failed {
        title_deed: String,
        reason: FailureReason,
        error: PlotError,
    },
}

impl PlotOutcome {
    pub fn status_message(&self) -> &str {
        match self {
            PlotOutcome::Plotted(report) => &report.status,
            PlotOutcome::Failed { reason, .. } => reason.message(),
        }
    }

    pub fn report(&self) -> Option<&PlotReport> {
        match self {
            PlotOutcome::Plotted(report) => Some(report),
            PlotOutcome::Failed { .. } => None,
        }
    }
}

pub struct DeedEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> DeedEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self, title_deed: &str) -> Result<PlotReport> {
        let title_deed = title_deed.trim();
        validate_non_empty_string("title_deed", title_deed)?;

        tracing::info!("🚀 Looking up title deed {}", title_deed);

        // Extract
        let deed = self.pipeline.extract(title_deed).await?;
        tracing::debug!("Extracted {} raw coordinates", deed.points.len());

        // Transform
        let plot = self.pipeline.transform(deed).await?;
        tracing::debug!("Projected ring with {} points", plot.ring.points().len());

        // Report
        let report = self.pipeline.report(plot).await?;
        tracing::info!("✅ Boundary ready for title deed {}", title_deed);

        Ok(report)
    }

    /// Like [`Self::run`], but lookup failures become a [`PlotOutcome::Failed`].
    /// Configuration and system errors still propagate.
    pub async fn resolve(&self, title_deed: &str) -> Result<PlotOutcome> {
        match self.run(title_deed).await {
            Ok(report) => Ok(PlotOutcome::Plotted(Box::new(report))),
            Err(error) => match error.failure_reason() {
                Some(reason) => {
                    tracing::warn!(
                        "Lookup for '{}' failed ({:?}): {}",
                        title_deed.trim(),
                        error.category(),
                        error
                    );
                    Ok(PlotOutcome::Failed {
                        title_deed: title_deed.trim().to_string(),
                        reason,
                        error,
                    })
                }
                None => Err(error),
            },
        }
    }
}
